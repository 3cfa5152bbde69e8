use keyring::Entry;
use sha2::{Digest, Sha256};

use super::store::{SecureStore, StoreError};

/// Default service name entries are filed under in the system keyring
pub const DEFAULT_SERVICE: &str = "credential-gate";

/// Secure store backed by the operating system keyring
/// (Keychain, Credential Manager, Secret Service)
pub struct KeyringStore {
    // Service name shared by every entry this store creates
    service: String,
}

impl KeyringStore {
    /// Create a store using the default service name
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Create a store filing its entries under a custom service name
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Map a logical key to the keyring account name.
    /// Derived keys embed the password, so only a SHA-256 digest of them
    /// reaches the keyring's entry list.
    pub fn account_name(key: &str) -> String {
        hex::encode(Sha256::digest(key.as_bytes()))
    }

    // Open the keyring entry for a logical key
    fn entry(&self, key: &str) -> Result<Entry, StoreError> {
        Entry::new(&self.service, &Self::account_name(key)).map_err(|e| map_keyring_error(key, e))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate keyring errors into store errors, keeping "no entry" distinguishable
fn map_keyring_error(key: &str, err: keyring::Error) -> StoreError {
    match err {
        keyring::Error::NoEntry => StoreError::NotFound(key.to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

impl SecureStore for KeyringStore {
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    fn get(&self, key: &str) -> Result<String, StoreError> {
        self.entry(key)?
            .get_password()
            .map_err(|e| map_keyring_error(key, e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| map_keyring_error(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entry(key)?
            .delete_password()
            .map_err(|e| map_keyring_error(key, e))
    }
}
