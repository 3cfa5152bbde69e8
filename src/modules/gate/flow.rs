use log::{debug, error, info, warn};
use std::fmt;

use super::config::GateConfig;
use super::credential::{Credential, LoginOutcome};
use crate::modules::prompt::{present_decision, present_login, PromptError, PromptService};
use crate::modules::security::{SecureStore, StoreError};
use crate::modules::utils::logging::log_gate_event;

pub const WRONG_CREDENTIALS_TITLE: &str = "Error";
pub const WRONG_CREDENTIALS_MESSAGE: &str = "Wrong username or password";

/// Errors that abort the credential flow
#[derive(Debug)]
pub enum GateError {
    Prompt(PromptError),
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::Prompt(e) => write!(f, "Credential prompt failed: {}", e),
        }
    }
}

impl std::error::Error for GateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GateError::Prompt(e) => Some(e),
        }
    }
}

impl From<PromptError> for GateError {
    fn from(e: PromptError) -> Self {
        GateError::Prompt(e)
    }
}

/// Drives the login / registration / remember-me flow on top of a
/// secure store and a prompt service
pub struct CredentialGate<S, P> {
    config: GateConfig,
    store: S,
    prompt: P,
}

impl<S: SecureStore, P: PromptService> CredentialGate<S, P> {
    pub fn new(config: GateConfig, store: S, prompt: P) -> Self {
        Self {
            config,
            store,
            prompt,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut P {
        &mut self.prompt
    }

    pub fn into_parts(self) -> (GateConfig, S, P) {
        (self.config, self.store, self.prompt)
    }

    /// Obtain credentials from the user.
    ///
    /// Returns the remembered login straight away when there is one.
    /// Otherwise asks until the user logs in with a registered account,
    /// registers a new one, or cancels. `Ok(None)` means the user gave up
    /// or the registration was rejected.
    pub fn acquire_credentials(&mut self) -> Result<Option<Credential>, GateError> {
        if self.config.remember_enabled {
            // Remembered pair is trusted as-is, no prompt at all
            if let Some(credential) = self.remembered_credentials() {
                self.log_event("login", &credential.user, true, Some("remembered login"));
                return Ok(Some(credential));
            }
        } else if let Err(e) = self.forget_credentials() {
            // Cleanup failure must not stop the login
            warn!("Could not clear remembered login: {}", e);
        }

        // Ask until a registered login, a registration or a cancel
        let mut outcome = present_login(&mut self.prompt, None, None)?;
        let credential = loop {
            match outcome {
                LoginOutcome::Cancelled => {
                    debug!("Login cancelled by user");
                    return Ok(None);
                }
                LoginOutcome::Register(credential) => match self.register(credential)? {
                    Some(credential) => break credential,
                    None => return Ok(None),
                },
                LoginOutcome::Login(credential) => {
                    if self.credentials_exist(&credential.user, &credential.pass) {
                        self.log_event("login", &credential.user, true, None);
                        break credential;
                    }
                    // Unknown pair -> show the login dialog again with an error
                    self.log_event("login", &credential.user, false, Some("wrong username or password"));
                    outcome = present_login(
                        &mut self.prompt,
                        Some(WRONG_CREDENTIALS_TITLE),
                        Some(WRONG_CREDENTIALS_MESSAGE),
                    )?;
                }
            }
        };

        // Offer to skip the dialog next time
        if self.config.remember_enabled {
            let remember = present_decision(
                &mut self.prompt,
                Some("Remember your Login?"),
                Some(""),
                Some("Yes"),
                Some("No"),
            )?;
            if remember {
                match self.remember_credentials(&credential.user, &credential.pass) {
                    Ok(()) => self.log_event("remember", &credential.user, true, None),
                    Err(e) => warn!("Could not remember login: {}", e),
                }
            }
        }

        Ok(Some(credential))
    }

    // Registration branch: reject duplicates, store, confirm or roll back
    fn register(&mut self, credential: Credential) -> Result<Option<Credential>, GateError> {
        // Same user and password already registered -> refuse, no retry
        if self.credentials_exist(&credential.user, &credential.pass) {
            self.log_event("register", &credential.user, false, Some("account already exists"));
            present_decision(
                &mut self.prompt,
                Some("Error while registering"),
                Some("This account already exists"),
                Some("OK"),
                None,
            )?;
            return Ok(None);
        }

        // The account key is shared by every password of this user,
        // so note whether this registration is the one creating it
        let account_existed = self.store.contains(&self.config.account_key(&credential.user));

        if let Err(e) = self.save_credentials(&credential.user, &credential.pass) {
            error!("Failed to store new account: {}", e);
            // Drop whatever half of the record made it in
            if let Err(e) = self.rollback_registration(&credential, account_existed) {
                warn!("Could not clean up partial registration: {}", e);
            }
            return Ok(None);
        }

        // Let the user confirm the new account before it is kept
        let accept = present_decision(
            &mut self.prompt,
            Some("New Account registered"),
            Some("Your credentials have been stored in the keychain"),
            Some("OK"),
            Some("Cancel"),
        )?;
        if !accept {
            if let Err(e) = self.rollback_registration(&credential, account_existed) {
                warn!("Could not roll back registration: {}", e);
            }
            self.log_event("register", &credential.user, false, Some("cancelled by user"));
            return Ok(None);
        }

        self.log_event("register", &credential.user, true, None);
        Ok(Some(credential))
    }

    // Undo a registration, keeping the account key when another password of
    // the same user still relies on it
    fn rollback_registration(
        &mut self,
        credential: &Credential,
        account_existed: bool,
    ) -> Result<(), StoreError> {
        if account_existed {
            let secret = self.config.secret_key(&credential.user, &credential.pass);
            self.remove_keys(&[secret])
        } else {
            self.delete_credentials(&credential.user, &credential.pass)
        }
    }

    // Gate events always carry the namespace they happened in
    fn log_event(&self, event: &str, user: &str, success: bool, details: Option<&str>) {
        log_gate_event(&self.config.namespace, event, user, success, details);
    }

    /// True iff an account is registered for exactly this user and password.
    /// Storage errors read as "not registered".
    pub fn credentials_exist(&self, user: &str, pass: &str) -> bool {
        let stored_user = self.store.get(&self.config.account_key(user));
        let stored_pass = self.store.get(&self.config.secret_key(user, pass));
        matches!((stored_user, stored_pass), (Ok(u), Ok(p)) if u == user && p == pass)
    }

    /// Register an account, overwriting an existing record for the same pair
    pub fn save_credentials(&mut self, user: &str, pass: &str) -> Result<(), StoreError> {
        self.store.set(&self.config.account_key(user), user)?;
        self.store.set(&self.config.secret_key(user, pass), pass)
    }

    /// Remove an account record. Missing entries count as removed.
    pub fn delete_credentials(&mut self, user: &str, pass: &str) -> Result<(), StoreError> {
        let keys = [self.config.account_key(user), self.config.secret_key(user, pass)];
        self.remove_keys(&keys)
    }

    /// Save the pair that lets the next run skip the login dialog
    pub fn remember_credentials(&mut self, user: &str, pass: &str) -> Result<(), StoreError> {
        self.store.set(&self.config.remember_user_key(), user)?;
        self.store.set(&self.config.remember_pass_key(), pass)
    }

    /// The remembered login, if both halves are stored
    pub fn remembered_credentials(&self) -> Option<Credential> {
        let user = self.store.get(&self.config.remember_user_key()).ok()?;
        let pass = self.store.get(&self.config.remember_pass_key()).ok()?;
        Some(Credential { user, pass })
    }

    /// Drop the remembered login. Calling it again is a no-op.
    pub fn forget_credentials(&mut self) -> Result<(), StoreError> {
        let keys = [self.config.remember_user_key(), self.config.remember_pass_key()];
        self.remove_keys(&keys)?;
        info!("Remembered login cleared for namespace '{}'", self.config.namespace);
        Ok(())
    }

    // Remove every key, tolerating absent ones; report the first real failure
    fn remove_keys(&mut self, keys: &[String]) -> Result<(), StoreError> {
        let mut first_error = None;
        for key in keys {
            match self.store.remove(key) {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::prompt::{ActionRole, ScriptedPrompt};
    use crate::modules::security::MemoryStore;

    type TestGate = CredentialGate<MemoryStore, ScriptedPrompt>;

    fn gate(remember: bool) -> TestGate {
        CredentialGate::new(
            GateConfig::new("test_").with_remember(remember),
            MemoryStore::new(),
            ScriptedPrompt::new(),
        )
    }

    fn gate_with(store: MemoryStore, prompt: ScriptedPrompt, remember: bool) -> TestGate {
        CredentialGate::new(GateConfig::new("test_").with_remember(remember), store, prompt)
    }

    fn titles(gate: &TestGate) -> Vec<String> {
        gate.prompt().presented().iter().map(|d| d.title.clone()).collect()
    }

    // Store that refuses every write and removal
    struct BrokenStore;

    impl SecureStore for BrokenStore {
        fn contains(&self, _key: &str) -> bool {
            false
        }
        fn get(&self, key: &str) -> Result<String, StoreError> {
            Err(StoreError::NotFound(key.to_string()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("locked".to_string()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("locked".to_string()))
        }
    }

    #[test]
    fn test_registered_pair_exists() {
        let mut gate = gate(true);
        gate.save_credentials("alice", "pw1").unwrap();

        assert!(gate.credentials_exist("alice", "pw1"));
        assert!(!gate.credentials_exist("alice", "pw2"));
        assert!(!gate.credentials_exist("bob", "pw1"));
    }

    #[test]
    fn test_mismatched_stored_value_not_registered() {
        let mut store = MemoryStore::new();
        store.set("test_alice", "someone-else").unwrap();
        store.set("test_alicepw1", "pw1").unwrap();

        let gate = gate_with(store, ScriptedPrompt::new(), true);
        assert!(!gate.credentials_exist("alice", "pw1"));
    }

    #[test]
    fn test_delete_credentials() {
        let mut gate = gate(true);
        gate.save_credentials("alice", "pw1").unwrap();
        assert!(gate.delete_credentials("alice", "pw1").is_ok());
        assert!(!gate.credentials_exist("alice", "pw1"));
        assert!(gate.store().is_empty());

        // Nothing left to delete is still fine
        assert!(gate.delete_credentials("alice", "pw1").is_ok());
    }

    #[test]
    fn test_remember_roundtrip() {
        let mut gate = gate(true);
        gate.remember_credentials("carol", "pw3").unwrap();
        assert_eq!(gate.remembered_credentials(), Some(Credential::new("carol", "pw3")));
        assert_eq!(gate.store().get("test_rememberUser").unwrap(), "carol");
        assert_eq!(gate.store().get("test_rememberPass").unwrap(), "pw3");
    }

    #[test]
    fn test_forget_is_idempotent() {
        let mut gate = gate(true);
        gate.remember_credentials("carol", "pw3").unwrap();

        assert!(gate.forget_credentials().is_ok());
        let after_once = gate.store().clone();
        assert!(gate.forget_credentials().is_ok());

        assert_eq!(gate.store().len(), after_once.len());
        assert!(gate.remembered_credentials().is_none());
        assert!(!gate.store().contains("test_rememberUser"));
        assert!(!gate.store().contains("test_rememberPass"));
    }

    #[test]
    fn test_half_remembered_login_is_ignored() {
        let mut store = MemoryStore::new();
        store.set("test_rememberUser", "carol").unwrap();

        let mut prompt = ScriptedPrompt::new();
        prompt.push_closed();
        let mut gate = gate_with(store, prompt, true);

        assert_eq!(gate.acquire_credentials().unwrap(), None);
        assert_eq!(titles(&gate), vec!["Login"]);
    }

    #[test]
    fn test_remembered_login_skips_prompts() {
        let mut gate = gate(true);
        gate.remember_credentials("carol", "pw3").unwrap();

        let result = gate.acquire_credentials().unwrap();
        assert_eq!(result, Some(Credential::new("carol", "pw3")));
        assert!(gate.prompt().presented().is_empty());
    }

    #[test]
    fn test_remember_disabled_clears_stored_login() {
        let mut store = MemoryStore::new();
        store.set("test_rememberUser", "carol").unwrap();
        store.set("test_rememberPass", "pw3").unwrap();

        let mut prompt = ScriptedPrompt::new();
        prompt.push_closed();
        let mut gate = gate_with(store, prompt, false);

        assert_eq!(gate.acquire_credentials().unwrap(), None);
        assert!(gate.store().is_empty());
        assert_eq!(titles(&gate), vec!["Login"]);
    }

    #[test]
    fn test_wrong_credentials_reprompt_until_cancel() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(0, &["alice", "pw1"]);
        prompt.push_choice(0, &["alice", "pw1"]);
        prompt.push_choice(0, &["alice", "other"]);
        prompt.push_choice(2, &["", ""]);
        let mut gate = gate_with(MemoryStore::new(), prompt, true);

        assert_eq!(gate.acquire_credentials().unwrap(), None);

        let presented = gate.prompt().presented();
        assert_eq!(presented.len(), 4);
        assert_eq!(presented[0].title, "Login");
        for dialog in &presented[1..] {
            assert_eq!(dialog.title, WRONG_CREDENTIALS_TITLE);
            assert_eq!(dialog.message, WRONG_CREDENTIALS_MESSAGE);
        }
        assert!(gate.store().is_empty());
    }

    #[test]
    fn test_wrong_credentials_then_register() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(0, &["alice", "pw1"]);
        prompt.push_choice(1, &["alice", "pw1"]);
        prompt.push_action(0); // confirm registration
        prompt.push_action(1); // don't remember
        let mut gate = gate_with(MemoryStore::new(), prompt, true);

        let result = gate.acquire_credentials().unwrap();
        assert_eq!(result, Some(Credential::new("alice", "pw1")));
        assert!(gate.credentials_exist("alice", "pw1"));
        assert!(gate.remembered_credentials().is_none());
        assert_eq!(
            titles(&gate),
            vec!["Login", "Error", "New Account registered", "Remember your Login?"]
        );
    }

    #[test]
    fn test_login_with_registered_account_and_remember() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(0, &["dave", "pw4"]);
        prompt.push_action(0); // remember: yes
        let mut gate = gate_with(MemoryStore::new(), prompt, true);
        gate.save_credentials("dave", "pw4").unwrap();

        let result = gate.acquire_credentials().unwrap();
        assert_eq!(result, Some(Credential::new("dave", "pw4")));
        assert_eq!(gate.remembered_credentials(), Some(Credential::new("dave", "pw4")));

        let remember_dialog = &gate.prompt().presented()[1];
        assert_eq!(remember_dialog.message, "");
        assert_eq!(remember_dialog.actions[0].label, "Yes");
        assert_eq!(remember_dialog.actions[1].role, ActionRole::Dismiss);
    }

    #[test]
    fn test_login_without_remember_skips_question() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(0, &["dave", "pw4"]);
        let mut gate = gate_with(MemoryStore::new(), prompt, false);
        gate.save_credentials("dave", "pw4").unwrap();

        assert_eq!(gate.acquire_credentials().unwrap(), Some(Credential::new("dave", "pw4")));
        assert_eq!(titles(&gate), vec!["Login"]);
    }

    #[test]
    fn test_register_accepted() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(1, &["bob", "pw2"]);
        prompt.push_action(0); // OK
        prompt.push_action(0); // remember: yes
        let mut gate = gate_with(MemoryStore::new(), prompt, true);

        let result = gate.acquire_credentials().unwrap();
        assert_eq!(result, Some(Credential::new("bob", "pw2")));
        assert!(gate.credentials_exist("bob", "pw2"));
        assert_eq!(gate.remembered_credentials(), Some(Credential::new("bob", "pw2")));

        let confirmation = &gate.prompt().presented()[1];
        assert_eq!(confirmation.message, "Your credentials have been stored in the keychain");
        let labels: Vec<&str> = confirmation.actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["OK", "Cancel"]);
    }

    #[test]
    fn test_register_cancelled_rolls_back() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(1, &["bob", "pw2"]);
        prompt.push_action(1); // Cancel
        let mut gate = gate_with(MemoryStore::new(), prompt, true);

        assert_eq!(gate.acquire_credentials().unwrap(), None);
        assert!(!gate.credentials_exist("bob", "pw2"));
        assert!(gate.store().is_empty());
        assert_eq!(titles(&gate), vec!["Login", "New Account registered"]);
    }

    #[test]
    fn test_register_cancelled_keeps_other_password() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(1, &["alice", "pw2"]);
        prompt.push_action(1); // Cancel
        let mut gate = gate_with(MemoryStore::new(), prompt, true);
        gate.save_credentials("alice", "pw1").unwrap();

        assert_eq!(gate.acquire_credentials().unwrap(), None);

        // Only the cancelled password is gone, the older account still works
        assert!(!gate.credentials_exist("alice", "pw2"));
        assert!(gate.credentials_exist("alice", "pw1"));
        assert!(!gate.store().contains("test_alicepw2"));
        assert_eq!(gate.store().len(), 2);
    }

    // Store that accepts the first write and refuses the rest
    struct FlakyStore {
        inner: MemoryStore,
        writes_left: usize,
    }

    impl SecureStore for FlakyStore {
        fn contains(&self, key: &str) -> bool {
            self.inner.contains(key)
        }
        fn get(&self, key: &str) -> Result<String, StoreError> {
            self.inner.get(key)
        }
        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.writes_left == 0 {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            self.writes_left -= 1;
            self.inner.set(key, value)
        }
        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_registration_write_keeps_other_password() {
        let mut inner = MemoryStore::new();
        inner.set("test_alice", "alice").unwrap();
        inner.set("test_alicepw1", "pw1").unwrap();

        // Account key write succeeds, password key write fails
        let store = FlakyStore { inner, writes_left: 1 };
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(1, &["alice", "pw2"]);
        let mut gate = CredentialGate::new(GateConfig::new("test_"), store, prompt);

        assert_eq!(gate.acquire_credentials().unwrap(), None);
        assert!(gate.credentials_exist("alice", "pw1"));
        assert!(!gate.credentials_exist("alice", "pw2"));
    }

    #[test]
    fn test_failed_registration_write_removes_new_account_key() {
        let store = FlakyStore { inner: MemoryStore::new(), writes_left: 1 };
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(1, &["bob", "pw2"]);
        let mut gate = CredentialGate::new(GateConfig::new("test_"), store, prompt);

        assert_eq!(gate.acquire_credentials().unwrap(), None);
        // The half-written record is cleaned up
        assert!(gate.store().inner.is_empty());
    }

    #[test]
    fn test_register_existing_account_rejected() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(1, &["bob", "pw2"]);
        prompt.push_action(0); // acknowledge
        let mut gate = gate_with(MemoryStore::new(), prompt, true);
        gate.save_credentials("bob", "pw2").unwrap();

        assert_eq!(gate.acquire_credentials().unwrap(), None);
        // The existing record is untouched
        assert!(gate.credentials_exist("bob", "pw2"));

        let notice = &gate.prompt().presented()[1];
        assert_eq!(notice.title, "Error while registering");
        assert_eq!(notice.message, "This account already exists");
        assert_eq!(notice.actions.len(), 1);
    }

    #[test]
    fn test_register_fails_when_store_refuses() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_choice(1, &["bob", "pw2"]);
        let mut gate = CredentialGate::new(GateConfig::new("test_"), BrokenStore, prompt);

        assert_eq!(gate.acquire_credentials().unwrap(), None);
        assert_eq!(gate.prompt().presented().len(), 1);
    }

    #[test]
    fn test_forget_reports_backend_errors() {
        let mut gate = CredentialGate::new(GateConfig::new("test_"), BrokenStore, ScriptedPrompt::new());
        assert_eq!(
            gate.forget_credentials(),
            Err(StoreError::Backend("locked".to_string()))
        );
    }

    #[test]
    fn test_remember_disabled_cleanup_failure_is_swallowed() {
        let mut prompt = ScriptedPrompt::new();
        prompt.push_closed();
        let mut gate = CredentialGate::new(
            GateConfig::new("test_").with_remember(false),
            BrokenStore,
            prompt,
        );

        assert_eq!(gate.acquire_credentials().unwrap(), None);
        assert_eq!(gate.prompt().presented().len(), 1);
    }

    #[test]
    fn test_prompt_failure_surfaces() {
        // No scripted responses: the prompt backend reports closed input
        let mut gate = gate(true);
        let err = gate.acquire_credentials().unwrap_err();
        assert!(matches!(err, GateError::Prompt(PromptError::Io(_))));
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut store = MemoryStore::new();
        {
            let mut first = CredentialGate::new(GateConfig::new("one_"), &mut store, ScriptedPrompt::new());
            first.save_credentials("alice", "pw1").unwrap();
            first.remember_credentials("alice", "pw1").unwrap();
        }

        let second = CredentialGate::new(GateConfig::new("two_"), store, ScriptedPrompt::new());
        assert!(!second.credentials_exist("alice", "pw1"));
        assert!(second.remembered_credentials().is_none());
    }
}
