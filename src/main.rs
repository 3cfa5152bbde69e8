use clap::{Arg, ArgAction, ArgMatches, Command};
use log::error;
use std::path::PathBuf;
use std::process;

use credential_gate::gate::ConfigError;
use credential_gate::prompt::{Dialog, PromptService};
use credential_gate::security::keyring::DEFAULT_SERVICE;
use credential_gate::utils::logging::initialize_logging;
use credential_gate::{CredentialGate, GateConfig, KeyringStore, SecureStore, DEFAULT_LOG_FILE};

fn build_cli() -> Command {
    Command::new("credential-gate")
        .about("Login prompt backed by the system keyring, with optional remember-me")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("namespace")
                .long("namespace")
                .value_name("NS")
                .help("Prefix for every stored key (overrides the config file)"),
        )
        .arg(
            Arg::new("no-remember")
                .long("no-remember")
                .help("Disable remember-me and clear any remembered login")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("service")
                .long("service")
                .value_name("NAME")
                .help("Keyring service name entries are filed under")
                .default_value(DEFAULT_SERVICE),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Where to write the log")
                .default_value(DEFAULT_LOG_FILE)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .subcommand(Command::new("login").about("Ask for credentials (default)"))
        .subcommand(Command::new("forget").about("Clear the remembered login"))
        .subcommand(Command::new("unregister").about("Delete a registered account"))
        .subcommand(Command::new("status").about("Show whether a login is remembered"))
}

/// Config file first, then command-line overrides
fn load_config(matches: &ArgMatches) -> Result<GateConfig, ConfigError> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GateConfig::load(path)?,
        None => GateConfig::default(),
    };
    if let Some(namespace) = matches.get_one::<String>("namespace") {
        config.namespace = namespace.clone();
    }
    if matches.get_flag("no-remember") {
        config.remember_enabled = false;
    }
    Ok(config)
}

fn run_login<S: SecureStore, P: PromptService>(gate: &mut CredentialGate<S, P>) -> i32 {
    match gate.acquire_credentials() {
        Ok(Some(credential)) => {
            println!("Logged in as {}", credential.user);
            0
        }
        Ok(None) => {
            println!("No credentials provided.");
            1
        }
        Err(e) => {
            error!("Login flow aborted: {}", e);
            eprintln!("Error: {}", e);
            2
        }
    }
}

fn run_forget<S: SecureStore, P: PromptService>(gate: &mut CredentialGate<S, P>) -> i32 {
    match gate.forget_credentials() {
        Ok(()) => {
            println!("Remembered login cleared.");
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    }
}

fn run_unregister<S: SecureStore, P: PromptService>(gate: &mut CredentialGate<S, P>) -> i32 {
    let dialog = Dialog::new("Unregister", "Enter the account to delete")
        .text_field("username")
        .secure_text_field("password")
        .action("Delete")
        .dismiss_action("Cancel");

    let response = match gate.prompt_mut().present(&dialog) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };
    if response.action != Some(0) {
        println!("Nothing deleted.");
        return 1;
    }

    let user = response.field_value(0).to_string();
    let pass = response.field_value(1).to_string();
    if !gate.credentials_exist(&user, &pass) {
        println!("No such account.");
        return 1;
    }
    match gate.delete_credentials(&user, &pass) {
        Ok(()) => {
            println!("Account {} deleted.", user);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    }
}

fn run_status<S: SecureStore, P: PromptService>(gate: &CredentialGate<S, P>) -> i32 {
    let config = gate.config();
    println!("Namespace:   {}", config.namespace);
    println!("Remember-me: {}", if config.remember_enabled { "enabled" } else { "disabled" });
    match gate.remembered_credentials() {
        Some(credential) => println!("Remembered:  {}", credential.user),
        None => println!("Remembered:  none"),
    }
    0
}

fn main() {
    let matches = build_cli().get_matches();

    if let Some(log_file) = matches.get_one::<PathBuf>("log-file") {
        if let Err(e) = initialize_logging(log_file) {
            eprintln!("Warning: logging disabled: {}", e);
        }
    }

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let service = matches
        .get_one::<String>("service")
        .map(String::as_str)
        .unwrap_or(DEFAULT_SERVICE);
    let store = KeyringStore::with_service(service);
    let mut gate = CredentialGate::new(config, store, credential_gate::TerminalPrompt::stdio());

    let code = match matches.subcommand() {
        Some(("forget", _)) => run_forget(&mut gate),
        Some(("unregister", _)) => run_unregister(&mut gate),
        Some(("status", _)) => run_status(&gate),
        _ => run_login(&mut gate),
    };
    process::exit(code);
}
