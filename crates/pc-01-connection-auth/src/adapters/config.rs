use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::TcpConnectorConfig;
use crate::service::HandshakeOptions;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    listener: ListenerSection,
    #[serde(default)]
    connector: ConnectorSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ListenerSection {
    bind_addr: Option<String>,
    handshake_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConnectorSection {
    nodelay: Option<bool>,
    connect_timeout_ms: Option<u64>,
    handshake_timeout_ms: Option<u64>,
}

/// Listener-side settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Address to bind.
    pub bind_addr: SocketAddr,
    /// Options for each server-side handshake.
    pub handshake: HandshakeOptions,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 0)),
            handshake: HandshakeOptions::default(),
        }
    }
}

/// Dial-side settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// TCP socket settings.
    pub tcp: TcpConnectorConfig,
    /// Options for each client-side handshake.
    pub handshake: HandshakeOptions,
}

/// Listener and connector settings loaded from TOML.
///
/// Credentials are not part of the file; register them at runtime.
///
/// # Config File Format
///
/// ```toml
/// [listener]
/// bind_addr = "127.0.0.1:7400"
/// handshake_timeout_ms = 5000
///
/// [connector]
/// nodelay = true
/// connect_timeout_ms = 3000
/// handshake_timeout_ms = 5000
/// ```
///
/// Every key is optional. Omitted timeouts mean no deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// Listener settings.
    pub listener: ListenerConfig,
    /// Connector settings.
    pub connector: ConnectorConfig,
}

impl AuthConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let defaults = Self::default();

        let bind_addr = match file.listener.bind_addr {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "listener.bind_addr",
                value: raw,
            })?,
            None => defaults.listener.bind_addr,
        };

        Ok(Self {
            listener: ListenerConfig {
                bind_addr,
                handshake: handshake_options(file.listener.handshake_timeout_ms),
            },
            connector: ConnectorConfig {
                tcp: TcpConnectorConfig {
                    nodelay: file
                        .connector
                        .nodelay
                        .unwrap_or(defaults.connector.tcp.nodelay),
                    connect_timeout: millis(file.connector.connect_timeout_ms),
                },
                handshake: handshake_options(file.connector.handshake_timeout_ms),
            },
        })
    }
}

/// Zero means "no deadline", same as leaving the key out.
fn millis(value: Option<u64>) -> Option<Duration> {
    value.filter(|ms| *ms > 0).map(Duration::from_millis)
}

fn handshake_options(timeout_ms: Option<u64>) -> HandshakeOptions {
    HandshakeOptions {
        timeout: millis(timeout_ms),
    }
}

/// Errors that can occur during config loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read {path}: {error}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Error message from the I/O operation.
        error: String,
    },

    /// TOML parsing error.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value parsed but is not usable.
    #[error("invalid value for {key}: '{value}'")]
    Invalid {
        /// Dotted key path.
        key: &'static str,
        /// The offending value.
        value: String,
    },
}
