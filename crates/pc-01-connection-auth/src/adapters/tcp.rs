use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::debug;

use crate::ports::{Authorizer, Connector, CredentialSource, Listener};
use crate::service::{AuthConnector, AuthListener};

// ============================================================================
// TcpListener
// ============================================================================

#[async_trait]
impl Listener for TcpListener {
    type Stream = TcpStream;

    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

impl AuthListener<TcpListener> {
    /// Bind a TCP listener and wrap it.
    ///
    /// # Errors
    ///
    /// Returns error if binding fails.
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        authorizer: impl Authorizer + 'static,
    ) -> io::Result<Self> {
        Self::bind_shared(addr, Arc::new(authorizer)).await
    }

    /// Bind a TCP listener sharing an existing authorizer.
    pub async fn bind_shared<A: ToSocketAddrs>(
        addr: A,
        authorizer: Arc<dyn Authorizer>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        debug!(addr = ?listener.local_addr().ok(), "authenticating listener bound");
        Ok(Self::with_shared_authorizer(listener, authorizer))
    }

    /// `IP_TTL` of the underlying socket.
    pub fn ttl(&self) -> io::Result<u32> {
        self.get_ref().ttl()
    }

    /// Set `IP_TTL` on the underlying socket.
    pub fn set_ttl(&self, ttl: u32) -> io::Result<()> {
        self.get_ref().set_ttl(ttl)
    }
}

// ============================================================================
// TcpConnector
// ============================================================================

/// Socket settings applied to every dialed TCP stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpConnectorConfig {
    /// Disable Nagle's algorithm.
    pub nodelay: bool,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Option<Duration>,
}

impl Default for TcpConnectorConfig {
    fn default() -> Self {
        Self {
            nodelay: true,
            connect_timeout: None,
        }
    }
}

/// Plain TCP dialer.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    config: TcpConnectorConfig,
}

impl TcpConnector {
    /// Dialer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dialer with the given settings.
    #[must_use]
    pub fn with_config(config: TcpConnectorConfig) -> Self {
        Self { config }
    }

    /// Settings in effect.
    pub fn config(&self) -> TcpConnectorConfig {
        self.config
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, destination: &str, port: u16) -> io::Result<TcpStream> {
        let dial = TcpStream::connect((destination, port));
        let stream = match self.config.connect_timeout {
            Some(after) => tokio::time::timeout(after, dial).await.map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {destination}:{port} timed out after {after:?}"),
                )
            })??,
            None => dial.await?,
        };
        stream.set_nodelay(self.config.nodelay)?;
        Ok(stream)
    }
}

impl<K: CredentialSource> AuthConnector<TcpConnector, K> {
    /// Authenticating TCP dialer with default socket settings.
    pub fn tcp(credentials: K) -> Self {
        Self::new(TcpConnector::new(), credentials)
    }
}
