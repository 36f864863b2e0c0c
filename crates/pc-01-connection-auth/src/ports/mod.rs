//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** the authorization check offered upward
//! - **Driven Ports (Outbound):** the authorizer, credential lookup and
//!   transports this subsystem is plugged into

pub mod inbound;
pub mod outbound;

pub use inbound::ConnectionGuard;
pub use outbound::{AuthStream, Authorizer, Connector, CredentialSource, Listener};
