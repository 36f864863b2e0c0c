//! # Domain Layer
//!
//! Pure types for the connection-authorization handshake: the credential,
//! the verdict byte, field framing and the error model. Nothing here
//! performs I/O.

mod credential;
mod errors;
mod verdict;
pub mod wire;

pub use credential::Credential;
pub(crate) use credential::constant_time_eq;
pub use errors::{AuthError, ProtocolError};
pub use verdict::Verdict;
pub use wire::MAX_FIELD_LEN;
