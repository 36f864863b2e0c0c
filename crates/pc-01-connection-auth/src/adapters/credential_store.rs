use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::Credential;
use crate::ports::CredentialSource;

// ============================================================================
// CredentialStore - per-destination credentials
// ============================================================================

lazy_static! {
    static ref GLOBAL_STORE: CredentialStore = CredentialStore::new();
}

/// Destination → credential map shared by every dial.
///
/// Entries are upserted and never expire; there is no persistence beyond
/// the process. Lookups and upserts may run concurrently, each entry is
/// replaced atomically.
#[derive(Debug, Default)]
pub struct CredentialStore {
    entries: RwLock<HashMap<String, Credential>>,
}

impl CredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store.
    ///
    /// Suits applications with a single dialer configuration; build
    /// separate stores with [`CredentialStore::new`] otherwise.
    pub fn global() -> &'static CredentialStore {
        &GLOBAL_STORE
    }

    /// Register `credential` for `destination`, replacing any previous one.
    ///
    /// Returns `true` if an entry was replaced.
    pub fn set_credential(&self, destination: impl Into<String>, credential: Credential) -> bool {
        let destination = destination.into();
        debug!(destination = %destination, login = %credential.login(), "registering credential");
        self.entries.write().insert(destination, credential).is_some()
    }

    /// Forget the credential for `destination`.
    pub fn remove(&self, destination: &str) -> Option<Credential> {
        self.entries.write().remove(destination)
    }

    /// Whether a credential is registered for `destination`.
    pub fn contains(&self, destination: &str) -> bool {
        self.entries.read().contains_key(destination)
    }

    /// Number of registered destinations.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registered destinations, in no particular order.
    pub fn destinations(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

impl CredentialSource for CredentialStore {
    fn credential_for(&self, destination: &str) -> Option<Credential> {
        self.entries.read().get(destination).cloned()
    }
}

// ============================================================================
// FixedCredential - one credential for every destination
// ============================================================================

/// Presents the same credential to every destination.
#[derive(Debug, Clone)]
pub struct FixedCredential {
    credential: Credential,
}

impl FixedCredential {
    /// Always present `credential`.
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

impl CredentialSource for FixedCredential {
    fn credential_for(&self, _destination: &str) -> Option<Credential> {
        Some(self.credential.clone())
    }
}
