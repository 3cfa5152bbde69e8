use log::debug;

use super::dialog::{Dialog, PromptError, PromptService};
use crate::modules::gate::credential::{Credential, LoginOutcome};

pub const DEFAULT_LOGIN_TITLE: &str = "Login";
pub const DEFAULT_LOGIN_MESSAGE: &str = "Enter your username and password";

const LOGIN_ACTION: usize = 0;
const REGISTER_ACTION: usize = 1;

/// Build the login dialog: username and password fields,
/// Login / Register buttons and a Cancel dismiss button
pub fn login_dialog(title: Option<&str>, message: Option<&str>) -> Dialog {
    Dialog::new(
        title.unwrap_or(DEFAULT_LOGIN_TITLE),
        message.unwrap_or(DEFAULT_LOGIN_MESSAGE),
    )
    .text_field("username")
    .secure_text_field("password")
    .action("Login")
    .action("Register")
    .dismiss_action("Cancel")
}

/// Show the login dialog and turn the user's choice into a [`LoginOutcome`].
/// Field values are passed through untouched.
pub fn present_login<P: PromptService + ?Sized>(
    prompt: &mut P,
    title: Option<&str>,
    message: Option<&str>,
) -> Result<LoginOutcome, PromptError> {
    let dialog = login_dialog(title, message);
    let response = prompt.present(&dialog)?;

    let credential = || Credential::new(response.field_value(0), response.field_value(1));

    let outcome = match response.action {
        Some(LOGIN_ACTION) => LoginOutcome::Login(credential()),
        Some(REGISTER_ACTION) => LoginOutcome::Register(credential()),
        _ => LoginOutcome::Cancelled,
    };
    debug!("Login dialog '{}' resolved to {}", dialog.title, outcome.kind());
    Ok(outcome)
}
