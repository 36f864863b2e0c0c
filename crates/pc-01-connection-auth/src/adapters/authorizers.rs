use std::collections::HashMap;
use std::fmt;

use crate::domain::{constant_time_eq, Credential};
use crate::ports::Authorizer;

/// Stand-in secret for unknown logins. Not valid UTF-8, so no received
/// password can ever equal it.
const DUMMY_SECRET: [u8; 32] = [0xFF; 32];

// ============================================================================
// StaticAuthorizer - fixed login/password table
// ============================================================================

/// Accepts credentials found in a fixed login → password table.
///
/// Password comparison is constant-time. An unknown login is still compared
/// against a dummy secret of typical password length, so the lookup miss
/// does not show up as a fast path.
#[derive(Clone, Default)]
pub struct StaticAuthorizer {
    accounts: HashMap<String, String>,
}

impl StaticAuthorizer {
    /// Empty table; rejects everything until accounts are added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with a single account.
    #[must_use]
    pub fn single(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new().with_account(login, password)
    }

    /// Add or replace an account.
    #[must_use]
    pub fn with_account(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.accounts.insert(login.into(), password.into());
        self
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Authorizer for StaticAuthorizer {
    fn authorize(&self, credential: &Credential) -> bool {
        match self.accounts.get(credential.login()) {
            Some(expected) => credential.password_matches(expected),
            None => {
                let matched = constant_time_eq(credential.password().as_bytes(), &DUMMY_SECRET);
                std::hint::black_box(matched);
                false
            }
        }
    }
}

impl fmt::Debug for StaticAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticAuthorizer")
            .field("logins", &self.accounts.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// DenyAll
// ============================================================================

/// Rejects every credential. Useful for draining a listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Authorizer for DenyAll {
    fn authorize(&self, _credential: &Credential) -> bool {
        false
    }
}
