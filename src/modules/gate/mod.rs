pub mod config;
pub mod credential;
pub mod flow;

pub use config::{ConfigError, GateConfig, DEFAULT_NAMESPACE};
pub use credential::{Credential, LoginOutcome};
pub use flow::{CredentialGate, GateError};
