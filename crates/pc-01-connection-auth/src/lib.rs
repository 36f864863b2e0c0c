//! # Connection Authorization Subsystem
//!
//! **Subsystem ID:** 1
//!
//! A login/password handshake that runs once on every freshly established
//! connection, before the RPC layer exchanges a single application byte.
//!
//! ## Wire Format
//!
//! ```text
//! client ──▶ server   [u16 BE len][login UTF-8][u16 BE len][password UTF-8]
//! client ◀── server   [u8 verdict]   0 = accepted, anything else = rejected
//! ```
//!
//! A stream that ends before the verdict byte arrives counts as rejected.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** Credential, verdict byte, field framing, errors
//! - **Ports Layer:** `Authorizer`, `CredentialSource`, `Listener`, `Connector`
//! - **Service Layer:** Run-once authorization state, listener/connector wrappers
//! - **Adapters Layer:** Credential store, authorizers, TCP and TOML (feature-gated)
//!
//! ## Features
//!
//! - `tcp` - `tokio::net` listener/connector adapters (default)
//! - `config` - TOML configuration loading (default)
//! - `test-utils` - `CountingAuthorizer`, `ByteCountingStream`
//!
//! ## Example
//!
//! ```rust,no_run
//! use pc_01_connection_auth::{
//!     AuthConnector, AuthListener, Credential, CredentialStore, StaticAuthorizer,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let listener =
//!     AuthListener::bind("127.0.0.1:7400", StaticAuthorizer::single("login", "password")).await?;
//!
//! tokio::spawn(async move {
//!     loop {
//!         match listener.accept().await {
//!             // `stream` is authenticated; hand it to the RPC layer.
//!             Ok((stream, peer)) => drop((stream, peer)),
//!             // That connection is already closed; keep serving.
//!             Err(e) => tracing::warn!(error = %e, "rejected inbound connection"),
//!         }
//!     }
//! });
//!
//! CredentialStore::global().set_credential("127.0.0.1", Credential::new("login", "password"));
//! let connector = AuthConnector::tcp(CredentialStore::global());
//! let stream = connector.connect("127.0.0.1", 7400).await?;
//! # let _ = stream;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod domain;
pub mod ports;
pub mod service;

/// Credential sources, authorizers, TCP and TOML adapters.
/// TCP requires feature `tcp`; TOML requires feature `config`.
pub mod adapters;

/// Test utilities (CountingAuthorizer, ByteCountingStream)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// CORE RE-EXPORTS (Always Available)
// =============================================================================

// Domain
pub use domain::{AuthError, Credential, ProtocolError, Verdict, MAX_FIELD_LEN};

// Port traits
pub use ports::{AuthStream, Authorizer, ConnectionGuard, Connector, CredentialSource, Listener};

// Service
pub use service::{
    AcceptedConnection, AuthConnector, AuthListener, ClientAuthorization, ClientRole,
    ConnectionAuthorization, HandshakeOptions, HandshakeRole, ServerAuthorization, ServerRole,
};

// Adapters
pub use adapters::{CredentialStore, DenyAll, FixedCredential, StaticAuthorizer};

// =============================================================================
// ADAPTER RE-EXPORTS (Feature-Gated)
// =============================================================================

#[cfg(feature = "tcp")]
pub use adapters::{TcpConnector, TcpConnectorConfig};

#[cfg(feature = "config")]
pub use adapters::{AuthConfig, ConfigError, ConnectorConfig, ListenerConfig};

// =============================================================================
// TEST UTILITIES (Requires `test-utils` feature)
// =============================================================================

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::{ByteCounters, ByteCountingStream, CountingAuthorizer};
