use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "credential_gate";

const REMEMBER_USER_SUFFIX: &str = "rememberUser";
const REMEMBER_PASS_SUFFIX: &str = "rememberPass";

/// Errors raised while loading a configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_remember() -> bool {
    true
}

/// Settings of one credential gate.
///
/// The namespace prefixes every key the gate writes, so several gates can
/// share one secure store without seeing each other's accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub namespace: String,
    #[serde(default = "default_remember")]
    pub remember_enabled: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl GateConfig {
    /// Create a configuration with remember-me enabled
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            remember_enabled: true,
        }
    }

    pub fn with_remember(mut self, enabled: bool) -> Self {
        self.remember_enabled = enabled;
        self
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&data).map_err(ConfigError::Parse)
    }

    /// Key holding the username of a registered account
    pub fn account_key(&self, user: &str) -> String {
        format!("{}{}", self.namespace, user)
    }

    /// Key holding the password of a registered account
    pub fn secret_key(&self, user: &str, pass: &str) -> String {
        format!("{}{}{}", self.namespace, user, pass)
    }

    pub fn remember_user_key(&self) -> String {
        format!("{}{}", self.namespace, REMEMBER_USER_SUFFIX)
    }

    pub fn remember_pass_key(&self) -> String {
        format!("{}{}", self.namespace, REMEMBER_PASS_SUFFIX)
    }
}
