//! # Portcullis Telemetry
//!
//! Structured logging setup shared by every Portcullis binary and test
//! suite. Library crates only emit `tracing` events; this crate decides
//! where they go.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use portcullis_telemetry::{init_tracing, TelemetryConfig, TelemetryError};
//!
//! match init_tracing(&TelemetryConfig::from_env()) {
//!     Ok(()) | Err(TelemetryError::AlreadyInitialized) => {}
//!     Err(e) => eprintln!("telemetry disabled: {e}"),
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PC_SERVICE_NAME` | `portcullis` | Service name in the startup line |
//! | `PC_LOG_LEVEL` | `RUST_LOG`, then `info` | Log filter |
//! | `PC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `PC_JSON_LOGS` | `false` | JSON-formatted lines |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// A global subscriber is already installed in this process.
    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,

    /// The configuration could not be applied.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
