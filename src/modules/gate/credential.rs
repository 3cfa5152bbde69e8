use std::fmt;

/// A username/password pair, both opaque
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub pass: String,
}

impl Credential {
    pub fn new(user: &str, pass: &str) -> Self {
        Self {
            user: user.to_string(),
            pass: pass.to_string(),
        }
    }
}

// Keep passwords out of debug output and logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user", &self.user)
            .field("pass", &"***")
            .finish()
    }
}

/// Result of a login dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Login(Credential),    // User pressed "Login"
    Register(Credential), // User pressed "Register"
    Cancelled,            // User dismissed the dialog
}

impl LoginOutcome {
    /// Short name of the variant, safe to log
    pub fn kind(&self) -> &'static str {
        match self {
            LoginOutcome::Login(_) => "login",
            LoginOutcome::Register(_) => "register",
            LoginOutcome::Cancelled => "cancelled",
        }
    }
}
