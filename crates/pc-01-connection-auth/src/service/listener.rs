//! Listener wrapper that only yields authorized connections.

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::authorization::{HandshakeOptions, ServerAuthorization};
use crate::domain::AuthError;
use crate::ports::{Authorizer, Listener};

/// A connection that passed the server-side handshake.
#[derive(Debug)]
pub struct AcceptedConnection<S> {
    /// The stream, positioned at the first application byte.
    pub stream: S,
    /// Remote address reported by the underlying listener.
    pub peer_addr: SocketAddr,
    /// Login the peer authenticated as.
    pub login: String,
}

/// Wraps a plain listener so that `accept` runs the server-side handshake
/// before returning.
///
/// A failed handshake closes that connection and makes `accept` return the
/// error. The listener itself is unaffected; call `accept` again to serve
/// the next client:
///
/// ```rust,ignore
/// loop {
///     match listener.accept().await {
///         Ok((stream, peer)) => { tokio::spawn(serve(stream, peer)); }
///         Err(e) => tracing::warn!(error = %e, "rejected inbound connection"),
///     }
/// }
/// ```
///
/// One handshake runs per `accept` call, on the calling task.
pub struct AuthListener<L> {
    inner: L,
    authorizer: Arc<dyn Authorizer>,
    options: HandshakeOptions,
}

impl<L: Listener> AuthListener<L> {
    /// Wrap `inner`, deciding every connection with `authorizer`.
    pub fn new(inner: L, authorizer: impl Authorizer + 'static) -> Self {
        Self::with_shared_authorizer(inner, Arc::new(authorizer))
    }

    /// Wrap `inner` with an authorizer shared with other listeners.
    pub fn with_shared_authorizer(inner: L, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            inner,
            authorizer,
            options: HandshakeOptions::default(),
        }
    }

    /// Replace the handshake options used for every accepted connection.
    #[must_use]
    pub fn with_options(mut self, options: HandshakeOptions) -> Self {
        self.options = options;
        self
    }

    /// Accept the next connection and authorize it.
    ///
    /// # Errors
    ///
    /// Errors from the underlying listener are returned as [`AuthError::Io`].
    /// Handshake failures are returned as-is; the offending connection is
    /// already closed.
    pub async fn accept(&self) -> Result<(L::Stream, SocketAddr), AuthError> {
        let accepted = self.accept_identified().await?;
        Ok((accepted.stream, accepted.peer_addr))
    }

    /// Like [`accept`](Self::accept), also reporting the authenticated login.
    pub async fn accept_identified(&self) -> Result<AcceptedConnection<L::Stream>, AuthError> {
        let (stream, peer_addr) = self.inner.accept().await?;
        debug!(peer = %peer_addr, "authorizing inbound connection");

        let auth = ServerAuthorization::server(stream, Arc::clone(&self.authorizer))
            .with_options(self.options);
        if let Err(err) = auth.ensure_authorized().await {
            warn!(peer = %peer_addr, error = %err, "inbound connection failed authorization");
            return Err(err);
        }

        let login = auth.authenticated_login().unwrap_or_default().to_owned();
        let stream = auth.into_authorized().await?;
        debug!(peer = %peer_addr, login = %login, "inbound connection authorized");
        Ok(AcceptedConnection {
            stream,
            peer_addr,
            login,
        })
    }

    /// Address of the underlying listener.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// The authorizer consulted for each connection.
    pub fn authorizer(&self) -> &Arc<dyn Authorizer> {
        &self.authorizer
    }

    /// The handshake options in effect.
    pub fn options(&self) -> HandshakeOptions {
        self.options
    }

    /// Borrow the underlying listener, for socket options.
    pub fn get_ref(&self) -> &L {
        &self.inner
    }

    /// Unwrap the underlying listener.
    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: fmt::Debug> fmt::Debug for AuthListener<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthListener")
            .field("inner", &self.inner)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// An `AuthListener` is itself a [`Listener`], so it can be stacked under
/// anything that expects a plain one. Handshake failures surface as
/// `io::Error`s wrapping the [`AuthError`].
#[async_trait]
impl<L: Listener> Listener for AuthListener<L> {
    type Stream = L::Stream;

    async fn accept(&self) -> io::Result<(Self::Stream, SocketAddr)> {
        AuthListener::accept(self).await.map_err(io::Error::from)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        AuthListener::local_addr(self)
    }
}
