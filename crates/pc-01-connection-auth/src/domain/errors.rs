//! Errors raised by the connection-authorization handshake.

use std::io;
use std::time::Duration;
use thiserror::Error;

use super::Credential;

/// Framing problems detected while encoding or decoding handshake fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A field does not fit the 16-bit length prefix.
    #[error("{field} is {len} bytes, longer than the {max}-byte frame limit", max = super::MAX_FIELD_LEN)]
    FieldTooLong {
        /// Which field ("login" or "password").
        field: &'static str,
        /// Encoded length in bytes.
        len: usize,
    },

    /// A received field is not valid UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 {
        /// Which field ("login" or "password").
        field: &'static str,
    },

    /// The stream ended before the field was fully received.
    #[error("stream closed while reading {field}")]
    Truncated {
        /// Which part of the frame was being read.
        field: &'static str,
    },
}

/// Error returned by `ensure_authorized`, `accept` and `connect`.
///
/// Every variant means the connection has already been closed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server rejected the credential, or no verdict arrived.
    #[error("authorization failed for login '{}'", credential.login())]
    AuthorizationFailed {
        /// The credential that was rejected.
        credential: Credential,
    },

    /// No credential is registered for the dialed destination.
    #[error("no credential registered for destination '{destination}'")]
    NoCredential {
        /// Destination passed to `connect`.
        destination: String,
    },

    /// Malformed or incomplete handshake framing.
    #[error("handshake protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport failure during the handshake.
    #[error("I/O error during handshake: {0}")]
    Io(#[from] io::Error),

    /// The configured handshake deadline elapsed.
    #[error("handshake did not complete within {after:?}")]
    TimedOut {
        /// The configured deadline.
        after: Duration,
    },

    /// A previous handshake on this connection object already failed.
    #[error("connection closed after failed handshake: {reason}")]
    Closed {
        /// Description of the original failure.
        reason: String,
    },
}

impl AuthError {
    /// True for verdict failures, false for transport or framing failures.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Self::AuthorizationFailed { .. } | Self::NoCredential { .. }
        )
    }

    /// The credential carried by an `AuthorizationFailed` error.
    pub fn rejected_credential(&self) -> Option<&Credential> {
        match self {
            Self::AuthorizationFailed { credential } => Some(credential),
            _ => None,
        }
    }

    fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::AuthorizationFailed { .. } | Self::NoCredential { .. } => {
                io::ErrorKind::PermissionDenied
            }
            Self::Protocol(_) => io::ErrorKind::InvalidData,
            Self::Io(e) => e.kind(),
            Self::TimedOut { .. } => io::ErrorKind::TimedOut,
            Self::Closed { .. } => io::ErrorKind::NotConnected,
        }
    }
}

/// Lets the wrappers stand in for plain listeners and connectors, whose
/// operations report `io::Error`. The original `AuthError` stays reachable
/// through `io::Error::get_ref`.
impl From<AuthError> for io::Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Io(inner) => inner,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}
