//! Per-connection authorization state.
//!
//! ## State Machine
//!
//! ```text
//!            ensure_authorized()
//! Pending ───────────────────────▶ InProgress ──ok──▶ Authorized (terminal)
//!                                      │
//!                                      └──err──▶ Failed (terminal, stream dropped)
//! ```
//!
//! The phase and the stream sit behind one async mutex, so the
//! check → run → set sequence is serialised per connection object. A caller
//! that finds `InProgress` on entry knows the previous attempt was cancelled
//! mid-exchange; the wire position is unknown, so the connection is closed.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use super::roles::{ClientRole, HandshakeRole, ServerRole};
use crate::domain::{AuthError, Credential};
use crate::ports::{AuthStream, Authorizer, ConnectionGuard};

/// Tuning for a single handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandshakeOptions {
    /// Deadline for the whole exchange. `None` waits as long as the
    /// transport does.
    pub timeout: Option<Duration>,
}

impl HandshakeOptions {
    /// Options with a deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

enum Phase {
    Pending,
    InProgress,
    Authorized,
    Failed(Failure),
}

enum Failure {
    Rejected(Credential),
    Broken(String),
}

impl Failure {
    fn record(err: &AuthError) -> Self {
        match err {
            AuthError::AuthorizationFailed { credential } => Self::Rejected(credential.clone()),
            other => Self::Broken(other.to_string()),
        }
    }

    fn replay(&self) -> AuthError {
        match self {
            Self::Rejected(credential) => AuthError::AuthorizationFailed {
                credential: credential.clone(),
            },
            Self::Broken(reason) => AuthError::Closed {
                reason: reason.clone(),
            },
        }
    }
}

struct Slot<S> {
    stream: Option<S>,
    phase: Phase,
}

/// Authorization state attached to one connection.
///
/// Use the [`ClientAuthorization`] and [`ServerAuthorization`] aliases.
pub struct ConnectionAuthorization<S, R> {
    role: R,
    options: HandshakeOptions,
    slot: Mutex<Slot<S>>,
    /// Set once, after the handshake succeeded; holds the authenticated login.
    authenticated: OnceCell<String>,
}

/// Client half: asserts a credential on a freshly dialed stream.
pub type ClientAuthorization<S> = ConnectionAuthorization<S, ClientRole>;

/// Server half: verifies the credential on a freshly accepted stream.
pub type ServerAuthorization<S> = ConnectionAuthorization<S, ServerRole>;

impl<S: AuthStream> ClientAuthorization<S> {
    /// Client-side state for `stream`, presenting `credential`.
    pub fn client(stream: S, credential: Credential) -> Self {
        Self::new(stream, ClientRole::new(credential))
    }
}

impl<S: AuthStream> ServerAuthorization<S> {
    /// Server-side state for `stream`, deciding with `authorizer`.
    pub fn server(stream: S, authorizer: Arc<dyn Authorizer>) -> Self {
        Self::new(stream, ServerRole::new(authorizer))
    }
}

impl<S, R> ConnectionAuthorization<S, R>
where
    S: AuthStream,
    R: HandshakeRole,
{
    /// Attach authorization state to a stream on which nothing has been
    /// exchanged yet.
    pub fn new(stream: S, role: R) -> Self {
        Self {
            role,
            options: HandshakeOptions::default(),
            slot: Mutex::new(Slot {
                stream: Some(stream),
                phase: Phase::Pending,
            }),
            authenticated: OnceCell::new(),
        }
    }

    /// Replace the handshake options.
    #[must_use]
    pub fn with_options(mut self, options: HandshakeOptions) -> Self {
        self.options = options;
        self
    }

    /// The role driving this connection.
    pub fn role(&self) -> &R {
        &self.role
    }

    /// Run the handshake unless it already ran.
    ///
    /// Concurrent callers on the same object queue on the internal lock;
    /// exactly one performs the exchange and the rest observe its result.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AuthorizationFailed`] when the credential was rejected
    /// - [`AuthError::Protocol`] / [`AuthError::Io`] on framing or transport failure
    /// - [`AuthError::TimedOut`] when the configured deadline elapsed
    /// - [`AuthError::Closed`] on any call after a failed or cancelled attempt
    ///
    /// In every error case the stream has been shut down and dropped.
    pub async fn ensure_authorized(&self) -> Result<(), AuthError> {
        if self.authenticated.initialized() {
            return Ok(());
        }

        let mut guard = self.slot.lock().await;
        let slot = &mut *guard;
        match &slot.phase {
            Phase::Authorized => return Ok(()),
            Phase::Failed(failure) => return Err(failure.replay()),
            Phase::Pending | Phase::InProgress => {}
        }
        if matches!(slot.phase, Phase::InProgress) {
            let err = AuthError::Closed {
                reason: "a previous handshake attempt was cancelled".into(),
            };
            Self::close(slot, &err).await;
            return Err(err);
        }

        let Some(stream) = slot.stream.as_mut() else {
            // Unreachable in practice: the stream only leaves the slot on failure.
            return Err(AuthError::Closed {
                reason: "stream already released".into(),
            });
        };

        debug!(side = R::SIDE, "running connection handshake");
        slot.phase = Phase::InProgress;
        let outcome = match self.options.timeout {
            Some(after) => match tokio::time::timeout(after, self.role.perform(stream)).await {
                Ok(result) => result,
                Err(_) => Err(AuthError::TimedOut { after }),
            },
            None => self.role.perform(stream).await,
        };

        match outcome {
            Ok(login) => {
                slot.phase = Phase::Authorized;
                // Only this branch sets the cell, and only while holding the lock.
                let _ = self.authenticated.set(login);
                Ok(())
            }
            Err(err) => {
                Self::close(slot, &err).await;
                Err(err)
            }
        }
    }

    /// Whether the handshake has succeeded. Never reverts once `true`.
    pub fn is_authorized(&self) -> bool {
        self.authenticated.initialized()
    }

    /// Login authenticated by the handshake, once it has succeeded.
    ///
    /// On the server side this is the peer's identity, for audit logging.
    pub fn authenticated_login(&self) -> Option<&str> {
        self.authenticated.get().map(String::as_str)
    }

    /// Run the handshake if needed and release the stream to the caller.
    ///
    /// This is the only way to get the stream back out, so an
    /// unauthenticated stream is never handed over.
    pub async fn into_authorized(self) -> Result<S, AuthError> {
        self.ensure_authorized().await?;
        self.slot
            .into_inner()
            .stream
            .ok_or_else(|| AuthError::Closed {
                reason: "stream already released".into(),
            })
    }

    async fn close(slot: &mut Slot<S>, err: &AuthError) {
        debug!(side = R::SIDE, error = %err, "handshake failed, closing connection");
        slot.phase = Phase::Failed(Failure::record(err));
        if let Some(mut stream) = slot.stream.take() {
            // Best effort: the peer may already be gone.
            let _ = stream.shutdown().await;
        }
    }
}

#[async_trait]
impl<S, R> ConnectionGuard for ConnectionAuthorization<S, R>
where
    S: AuthStream,
    R: HandshakeRole,
{
    async fn ensure_authorized(&self) -> Result<(), AuthError> {
        ConnectionAuthorization::ensure_authorized(self).await
    }

    fn is_authorized(&self) -> bool {
        ConnectionAuthorization::is_authorized(self)
    }
}
