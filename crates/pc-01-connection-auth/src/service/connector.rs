//! Connector wrapper that authenticates right after dialing.

use async_trait::async_trait;
use std::fmt;
use std::io;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::authorization::{ClientAuthorization, HandshakeOptions};
use crate::domain::AuthError;
use crate::ports::{Connector, CredentialSource};

/// Wraps a plain connector so that `connect` presents the destination's
/// credential before returning the stream.
pub struct AuthConnector<C, K> {
    inner: C,
    credentials: K,
    options: HandshakeOptions,
}

impl<C, K> AuthConnector<C, K>
where
    C: Connector,
    K: CredentialSource,
{
    /// Wrap `inner`, looking credentials up in `credentials`.
    pub fn new(inner: C, credentials: K) -> Self {
        Self {
            inner,
            credentials,
            options: HandshakeOptions::default(),
        }
    }

    /// Replace the handshake options used for every dial.
    #[must_use]
    pub fn with_options(mut self, options: HandshakeOptions) -> Self {
        self.options = options;
        self
    }

    /// Dial `destination:port` and authenticate.
    ///
    /// The credential is looked up after the dial succeeds, so every call
    /// sees the latest `set_credential` for the destination.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NoCredential`] if nothing is registered for
    ///   `destination`; no byte is sent and the connection is closed
    /// - [`AuthError::AuthorizationFailed`] if the server rejected the credential
    /// - [`AuthError::Io`] / [`AuthError::Protocol`] / [`AuthError::TimedOut`]
    ///   on dial or handshake failure
    pub async fn connect(&self, destination: &str, port: u16) -> Result<C::Stream, AuthError> {
        let mut stream = self.inner.connect(destination, port).await?;

        let Some(credential) = self.credentials.credential_for(destination) else {
            warn!(destination = %destination, port, "no credential registered, closing connection");
            let _ = stream.shutdown().await;
            return Err(AuthError::NoCredential {
                destination: destination.to_owned(),
            });
        };

        debug!(destination = %destination, port, login = %credential.login(), "authenticating outbound connection");
        ClientAuthorization::client(stream, credential)
            .with_options(self.options)
            .into_authorized()
            .await
    }

    /// The credential source consulted on every dial.
    pub fn credentials(&self) -> &K {
        &self.credentials
    }

    /// The handshake options in effect.
    pub fn options(&self) -> HandshakeOptions {
        self.options
    }

    /// Borrow the underlying connector.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }
}

impl<C: fmt::Debug, K> fmt::Debug for AuthConnector<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConnector")
            .field("inner", &self.inner)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C, K> Connector for AuthConnector<C, K>
where
    C: Connector,
    K: CredentialSource,
{
    type Stream = C::Stream;

    async fn connect(&self, destination: &str, port: u16) -> io::Result<Self::Stream> {
        AuthConnector::connect(self, destination, port)
            .await
            .map_err(io::Error::from)
    }
}
