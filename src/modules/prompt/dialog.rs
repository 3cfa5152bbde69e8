use std::fmt;
use std::io;

/// Errors raised while presenting a dialog
#[derive(Debug)]
pub enum PromptError {
    InvalidArgument(String), // Caller built an unusable dialog
    Io(io::Error),           // The prompt backend failed to talk to the user
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            PromptError::Io(e) => write!(f, "Prompt I/O error: {}", e),
        }
    }
}

impl std::error::Error for PromptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PromptError::Io(e) => Some(e),
            PromptError::InvalidArgument(_) => None,
        }
    }
}

impl From<io::Error> for PromptError {
    fn from(e: io::Error) -> Self {
        PromptError::Io(e)
    }
}

/// How a text field shows what the user types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Plain,
    Masked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub placeholder: String,
    pub kind: FieldKind,
}

/// Role of a button in a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRole {
    Default,
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub role: ActionRole,
}

/// Description of a modal dialog: text, input fields and buttons.
///
/// Actions keep the order they were added in; renderers show the
/// dismiss action last (see [`Dialog::display_order`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub fields: Vec<TextField>,
    pub actions: Vec<Action>,
}

impl Dialog {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            fields: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a visible text field
    pub fn text_field(mut self, placeholder: &str) -> Self {
        self.fields.push(TextField {
            placeholder: placeholder.to_string(),
            kind: FieldKind::Plain,
        });
        self
    }

    /// Add a masked text field
    pub fn secure_text_field(mut self, placeholder: &str) -> Self {
        self.fields.push(TextField {
            placeholder: placeholder.to_string(),
            kind: FieldKind::Masked,
        });
        self
    }

    /// Add a regular button
    pub fn action(mut self, label: &str) -> Self {
        self.actions.push(Action {
            label: label.to_string(),
            role: ActionRole::Default,
        });
        self
    }

    /// Add the dismiss button, replacing any previous one
    pub fn dismiss_action(mut self, label: &str) -> Self {
        self.actions.retain(|a| a.role != ActionRole::Dismiss);
        self.actions.push(Action {
            label: label.to_string(),
            role: ActionRole::Dismiss,
        });
        self
    }

    /// Index of the dismiss action, if the dialog has one
    pub fn dismiss_index(&self) -> Option<usize> {
        self.actions.iter().position(|a| a.role == ActionRole::Dismiss)
    }

    /// Indices of the actions in the order they should be rendered:
    /// regular actions first, dismiss action last
    pub fn display_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.actions.len())
            .filter(|&i| self.actions[i].role == ActionRole::Default)
            .collect();
        order.extend(self.dismiss_index());
        order
    }
}

/// What the user did with a dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogResponse {
    /// Index into `Dialog::actions`, `None` if the dialog closed without a choice
    pub action: Option<usize>,
    pub field_values: Vec<String>,
}

impl DialogResponse {
    pub fn new(action: Option<usize>, field_values: Vec<String>) -> Self {
        Self {
            action,
            field_values,
        }
    }

    /// Value of the field at `index`, empty if the field was never filled
    pub fn field_value(&self, index: usize) -> &str {
        self.field_values.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Presents modal dialogs to the user and blocks until one is resolved
pub trait PromptService {
    fn present(&mut self, dialog: &Dialog) -> Result<DialogResponse, PromptError>;
}

impl<P: PromptService + ?Sized> PromptService for &mut P {
    fn present(&mut self, dialog: &Dialog) -> Result<DialogResponse, PromptError> {
        (**self).present(dialog)
    }
}
