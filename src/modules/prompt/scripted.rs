use std::collections::VecDeque;
use std::io;

use super::dialog::{Dialog, DialogResponse, PromptError, PromptService};

/// Prompt service answering from a queue of canned responses.
/// Every presented dialog is recorded so callers can check what was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    responses: VecDeque<DialogResponse>,
    presented: Vec<Dialog>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a choice of `action` with the given field values
    pub fn push_choice(&mut self, action: usize, fields: &[&str]) -> &mut Self {
        let fields = fields.iter().map(|f| f.to_string()).collect();
        self.responses.push_back(DialogResponse::new(Some(action), fields));
        self
    }

    /// Queue a choice of `action` on a dialog without fields
    pub fn push_action(&mut self, action: usize) -> &mut Self {
        self.push_choice(action, &[])
    }

    /// Queue a dialog that is closed without any choice
    pub fn push_closed(&mut self) -> &mut Self {
        self.responses.push_back(DialogResponse::new(None, Vec::new()));
        self
    }

    pub fn presented(&self) -> &[Dialog] {
        &self.presented
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl PromptService for ScriptedPrompt {
    fn present(&mut self, dialog: &Dialog) -> Result<DialogResponse, PromptError> {
        self.presented.push(dialog.clone());
        self.responses.pop_front().ok_or_else(|| {
            PromptError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("No scripted response left for dialog '{}'", dialog.title),
            ))
        })
    }
}
