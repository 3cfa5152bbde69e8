use log::debug;

use super::dialog::{ActionRole, Dialog, PromptError, PromptService};

/// Label of the only button shown when no yes/no labels are given
pub const ACKNOWLEDGE_LABEL: &str = "OK";

/// Build a decision dialog.
///
/// Title and message are mandatory. With neither label an acknowledgement
/// button is shown instead; it is added as a dismiss action so choosing it
/// resolves to `false`.
pub fn decision_dialog(
    title: Option<&str>,
    message: Option<&str>,
    yes_label: Option<&str>,
    no_label: Option<&str>,
) -> Result<Dialog, PromptError> {
    let (title, message) = match (title, message) {
        (Some(title), Some(message)) => (title, message),
        _ => {
            return Err(PromptError::InvalidArgument(
                "Undefined title or message".to_string(),
            ))
        }
    };

    let mut dialog = Dialog::new(title, message);
    if let Some(yes) = yes_label {
        dialog = dialog.action(yes);
    }
    if let Some(no) = no_label {
        dialog = dialog.dismiss_action(no);
    }
    if yes_label.is_none() && no_label.is_none() {
        dialog = dialog.dismiss_action(ACKNOWLEDGE_LABEL);
    }
    Ok(dialog)
}

/// Ask a yes/no question. `true` only when the primary (yes) action is chosen.
pub fn present_decision<P: PromptService + ?Sized>(
    prompt: &mut P,
    title: Option<&str>,
    message: Option<&str>,
    yes_label: Option<&str>,
    no_label: Option<&str>,
) -> Result<bool, PromptError> {
    let dialog = decision_dialog(title, message, yes_label, no_label)?;
    let response = prompt.present(&dialog)?;

    let accepted = match response.action.and_then(|i| dialog.actions.get(i)) {
        Some(action) => action.role == ActionRole::Default,
        None => false,
    };
    debug!("Decision dialog '{}' resolved to {}", dialog.title, accepted);
    Ok(accepted)
}
