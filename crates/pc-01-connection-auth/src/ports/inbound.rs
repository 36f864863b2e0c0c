//! # Driving Ports (Inbound API)
//!
//! What this subsystem offers to the layer above it.

use async_trait::async_trait;

use crate::domain::AuthError;

/// Per-connection authorization check.
///
/// Implementations run the handshake at most once. Every later call, from
/// any task, returns the outcome of that single run without touching the
/// wire again.
#[async_trait]
pub trait ConnectionGuard: Send + Sync {
    /// Run the handshake if it has not run yet.
    ///
    /// # Errors
    ///
    /// Returns the handshake failure. The connection is closed before the
    /// error is returned.
    async fn ensure_authorized(&self) -> Result<(), AuthError>;

    /// Whether a handshake on this connection has succeeded.
    fn is_authorized(&self) -> bool;
}
