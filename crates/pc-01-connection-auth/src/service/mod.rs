//! # Connection Authorization Service
//!
//! Wires the domain framing to real streams:
//!
//! - `protocol` - async reads/writes of the handshake frames
//! - `roles` - client and server halves of the exchange
//! - `authorization` - per-connection, run-once state machine
//! - `listener` / `connector` - drop-in wrappers for plain transports

mod authorization;
mod connector;
mod listener;
pub mod protocol;
mod roles;

pub use authorization::{
    ClientAuthorization, ConnectionAuthorization, HandshakeOptions, ServerAuthorization,
};
pub use connector::AuthConnector;
pub use listener::{AcceptedConnection, AuthListener};
pub use roles::{ClientRole, HandshakeRole, ServerRole};
