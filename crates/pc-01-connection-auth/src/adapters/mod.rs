//! # Adapters
//!
//! Concrete implementations of the ports.
//!
//! - `CredentialStore` / `FixedCredential` - dial-side credential sources
//! - `StaticAuthorizer` / `DenyAll` - ready-made authorizers
//! - `TcpConnector`, `Listener for TcpListener` - TCP transport (requires "tcp")
//! - `AuthConfig` - TOML settings for both sides (requires "config")

/// Ready-made authorizers
pub mod authorizers;
/// Dial-side credential sources
pub mod credential_store;
/// TCP transport adapters
#[cfg(feature = "tcp")]
pub mod tcp;
/// TOML configuration
#[cfg(feature = "config")]
pub mod config;

pub use authorizers::{DenyAll, StaticAuthorizer};
pub use credential_store::{CredentialStore, FixedCredential};

#[cfg(feature = "tcp")]
pub use tcp::{TcpConnector, TcpConnectorConfig};

#[cfg(feature = "config")]
pub use config::{AuthConfig, ConfigError, ConnectorConfig, ListenerConfig};
