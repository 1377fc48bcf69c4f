use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use keyring::Entry;
use thiserror::Error;

/// Service name used for keychain entries
const SERVICE_NAME: &str = "sessionward";

/// Well-known entries in the credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    /// The authentication token. Owned exclusively by the session lifecycle.
    Token,
    /// Path the user wanted before being sent to the login page.
    RedirectTarget,
    /// Marker identifying the signed-in user. Written by the host
    /// application, never by the session lifecycle; logout removes it.
    IdentityMarker,
}

impl CredentialKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::Token => "token",
            CredentialKey::RedirectTarget => "redirect-target",
            CredentialKey::IdentityMarker => "identity-marker",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Keychain error for {key}: {source}")]
    Keyring {
        key: CredentialKey,
        #[source]
        source: keyring::Error,
    },

    #[error("Credential backend error: {0}")]
    Backend(String),
}

/// Durable key-value storage for the token and auxiliary markers.
///
/// Removing an absent key is not an error.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError>;
    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: CredentialKey) -> Result<(), StoreError>;
}

/// Credential store backed by the OS keychain.
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a custom keychain service name (one per profile or environment)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: CredentialKey) -> Result<Entry, StoreError> {
        Entry::new(&self.service, key.as_str()).map_err(|source| StoreError::Keyring { key, source })
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(source) => Err(StoreError::Keyring { key, source }),
        }
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|source| StoreError::Keyring { key, source })
    }

    fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(source) => Err(StoreError::Keyring { key, source }),
        }
    }
}

/// Process-local credential store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<CredentialKey, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&key).cloned())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&key);
        Ok(())
    }
}
