// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{gate, prompt, security, utils};

// Re-export commonly used types
pub use modules::gate::{Credential, CredentialGate, GateConfig, GateError, LoginOutcome};
pub use modules::prompt::{PromptService, ScriptedPrompt, TerminalPrompt};
pub use modules::security::{KeyringStore, MemoryStore, SecureStore, StoreError};

// Constants
pub const DEFAULT_LOG_FILE: &str = "credential-gate.log";
