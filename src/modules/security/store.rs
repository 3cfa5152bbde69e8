use std::collections::HashMap;
use std::fmt;

/// Errors reported by a secure store backend
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    NotFound(String), // Key has no entry
    Backend(String),  // Anything else the backend refused to do
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(key) => write!(f, "No entry stored for key '{}'", key),
            StoreError::Backend(msg) => write!(f, "Secure store error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Key/value persistence the credential flow is built on.
///
/// Implementations are expected to keep entries across process restarts.
/// Every operation is atomic per key only.
pub trait SecureStore {
    /// Returns true if an entry exists for `key`
    fn contains(&self, key: &str) -> bool;

    /// Reads the value stored under `key`, `StoreError::NotFound` if absent
    fn get(&self, key: &str) -> Result<String, StoreError>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the entry under `key`, `StoreError::NotFound` if absent
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: SecureStore + ?Sized> SecureStore for &mut S {
    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }

    fn get(&self, key: &str) -> Result<String, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store, forgets everything when dropped
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SecureStore for MemoryStore {
    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Result<String, StoreError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}
