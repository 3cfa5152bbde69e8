pub mod keyring;
pub mod store;

pub use self::keyring::KeyringStore;
pub use store::{MemoryStore, SecureStore, StoreError};
