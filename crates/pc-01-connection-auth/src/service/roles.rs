//! The two halves of the handshake.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::protocol;
use crate::domain::{AuthError, Credential, Verdict};
use crate::ports::{AuthStream, Authorizer};

/// One side of the handshake.
///
/// `perform` runs the exchange exactly once on a fresh stream and returns
/// the login that was authenticated.
#[async_trait]
pub trait HandshakeRole: Send + Sync {
    /// "client" or "server", for logs.
    const SIDE: &'static str;

    /// Run this side of the exchange.
    async fn perform<S>(&self, stream: &mut S) -> Result<String, AuthError>
    where
        S: AuthStream;
}

// =============================================================================
// CLIENT ROLE
// =============================================================================

/// Asserts a credential and waits for the verdict.
#[derive(Clone)]
pub struct ClientRole {
    credential: Credential,
}

impl ClientRole {
    /// Client role presenting `credential`.
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// The credential this role presents.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

impl fmt::Debug for ClientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRole")
            .field("login", &self.credential.login())
            .finish()
    }
}

#[async_trait]
impl HandshakeRole for ClientRole {
    const SIDE: &'static str = "client";

    async fn perform<S>(&self, stream: &mut S) -> Result<String, AuthError>
    where
        S: AuthStream,
    {
        debug!(login = %self.credential.login(), "sending credential");
        protocol::write_credential(stream, &self.credential).await?;

        match protocol::read_verdict(stream).await? {
            Verdict::Accepted => {
                debug!(login = %self.credential.login(), "server accepted credential");
                Ok(self.credential.login().to_owned())
            }
            Verdict::Rejected => {
                warn!(login = %self.credential.login(), "server rejected credential");
                Err(AuthError::AuthorizationFailed {
                    credential: self.credential.clone(),
                })
            }
        }
    }
}

// =============================================================================
// SERVER ROLE
// =============================================================================

/// Collects a credential, consults the authorizer and answers.
#[derive(Clone)]
pub struct ServerRole {
    authorizer: Arc<dyn Authorizer>,
}

impl ServerRole {
    /// Server role deciding with `authorizer`.
    pub fn new(authorizer: Arc<dyn Authorizer>) -> Self {
        Self { authorizer }
    }
}

impl fmt::Debug for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRole").finish_non_exhaustive()
    }
}

#[async_trait]
impl HandshakeRole for ServerRole {
    const SIDE: &'static str = "server";

    async fn perform<S>(&self, stream: &mut S) -> Result<String, AuthError>
    where
        S: AuthStream,
    {
        // No verdict is written unless both fields were read in full.
        let credential = protocol::read_credential(stream).await?;
        let verdict = Verdict::from_decision(self.authorizer.authorize(&credential));
        let sent = protocol::write_verdict(stream, verdict).await;

        if verdict.is_accepted() {
            sent?;
            debug!(login = %credential.login(), "accepted credential");
            Ok(credential.login().to_owned())
        } else {
            // The rejection stands whether or not the peer saw the verdict.
            if let Err(e) = sent {
                debug!(login = %credential.login(), error = %e, "peer gone before rejection was sent");
            }
            info!(login = %credential.login(), "rejected credential");
            Err(AuthError::AuthorizationFailed { credential })
        }
    }
}
