pub mod decision;
pub mod dialog;
pub mod login;
pub mod scripted;
pub mod terminal;

pub use decision::present_decision;
pub use dialog::{Action, ActionRole, Dialog, DialogResponse, FieldKind, PromptError, PromptService, TextField};
pub use login::present_login;
pub use scripted::ScriptedPrompt;
pub use terminal::TerminalPrompt;
