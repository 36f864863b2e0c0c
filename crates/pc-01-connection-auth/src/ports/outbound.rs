//! # Driven Ports (Outbound SPI)
//!
//! Capabilities this subsystem requires from the embedding application or
//! from the transport underneath it.

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::Credential;

/// Byte stream the handshake can run over.
///
/// Plain TCP, an already-negotiated TLS session or an in-memory duplex all
/// qualify; the handshake never inspects the transport.
pub trait AuthStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> AuthStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Server-side decision on a received credential.
///
/// Invoked once per accepted connection, possibly from many tasks at the
/// same time. Implementations must be side-effect free or internally
/// synchronised.
///
/// Closures implement this trait directly:
///
/// ```rust
/// use pc_01_connection_auth::{Authorizer, Credential};
///
/// let only_admin = |c: &Credential| c.login() == "admin" && c.password_matches("s3cret");
/// assert!(only_admin.authorize(&Credential::new("admin", "s3cret")));
/// ```
pub trait Authorizer: Send + Sync {
    /// Return `true` to accept the connection.
    fn authorize(&self, credential: &Credential) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&Credential) -> bool + Send + Sync,
{
    fn authorize(&self, credential: &Credential) -> bool {
        self(credential)
    }
}

/// Dial-side lookup of the credential to present to a destination.
pub trait CredentialSource: Send + Sync {
    /// Credential for `destination`, or `None` if nothing is registered.
    fn credential_for(&self, destination: &str) -> Option<Credential>;
}

impl<T: CredentialSource + ?Sized> CredentialSource for Arc<T> {
    fn credential_for(&self, destination: &str) -> Option<Credential> {
        (**self).credential_for(destination)
    }
}

impl<T: CredentialSource + ?Sized> CredentialSource for &T {
    fn credential_for(&self, destination: &str) -> Option<Credential> {
        (**self).credential_for(destination)
    }
}

/// A plain listener that yields raw, unauthenticated connections.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Connection type produced by `accept`.
    type Stream: AuthStream + 'static;

    /// Wait for the next inbound connection.
    async fn accept(&self) -> io::Result<(Self::Stream, SocketAddr)>;

    /// Address the listener is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// A plain dialer that opens raw, unauthenticated connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connection type produced by `connect`.
    type Stream: AuthStream + 'static;

    /// Open a connection to `destination:port`.
    async fn connect(&self, destination: &str, port: u16) -> io::Result<Self::Stream>;
}
