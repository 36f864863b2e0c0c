//! Login/password pair asserted over the wire.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Immutable login/password pair.
///
/// Empty strings are valid identities; what they mean is up to the
/// [`Authorizer`](crate::ports::Authorizer). Both fields are zeroed when the
/// value is dropped, and `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    login: String,
    password: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    /// The login asserted by this credential.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// The password asserted by this credential.
    ///
    /// # Security
    ///
    /// Compare with [`Credential::password_matches`] instead of `==`
    /// where timing matters.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Constant-time comparison of the password against `expected`.
    pub fn password_matches(&self, expected: &str) -> bool {
        constant_time_eq(self.password.as_bytes(), expected.as_bytes())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Compare two byte strings without leaking the matching prefix length.
///
/// Both inputs are padded to the longer length with different fill bytes so
/// a length mismatch can never compare equal.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = a.len().max(b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a);
    b_padded[..b.len()].copy_from_slice(b);

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}
