//! Server verdict carried as the final handshake byte.

/// Outcome of a server-side authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Verdict {
    /// Credential accepted; the connection may carry application traffic.
    Accepted = 0x00,
    /// Credential rejected; both ends close the connection.
    Rejected = 0x01,
}

impl Verdict {
    /// Map an authorizer decision to a verdict.
    pub const fn from_decision(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }

    /// Wire encoding of this verdict.
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Decode a verdict byte. Only `0x00` means accepted.
    pub const fn from_byte(byte: u8) -> Self {
        if byte == Self::Accepted as u8 {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }

    /// Whether this verdict lets the connection through.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}
