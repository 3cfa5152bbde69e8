use env_logger::{Builder, WriteStyle};
use log::{info, warn, LevelFilter};
use std::fs::OpenOptions;
use std::path::Path;

/// Initialize logging to an append-mode log file.
/// Level defaults to Info and can be raised with RUST_LOG.
pub fn initialize_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Create or append to the log file
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::new()
        // Info by default, RUST_LOG wins when set
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        // Second precision timestamps and module paths
        .format_timestamp_secs()
        .format_module_path(true)
        // No color codes in a file
        .write_style(WriteStyle::Never)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;

    info!("Logging initialized at {}", path.display());
    Ok(())
}

/// Mask all but the first and last two characters
fn format_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Structured log line for a login, registration or remember event.
/// Usernames are masked, passwords never reach this function.
pub fn log_gate_event(
    namespace: &str,
    event_type: &str,
    username: &str,
    success: bool,
    details: Option<&str>,
) {
    // Local wall-clock time, the log file is read by people
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let line = format_gate_event(namespace, event_type, username, success, details, &timestamp);

    // Failures are warnings so they stand out at the default level
    if success {
        info!("{}", line);
    } else {
        warn!("{}", line);
    }
}

// Build the event line without emitting it
fn format_gate_event(
    namespace: &str,
    event_type: &str,
    username: &str,
    success: bool,
    details: Option<&str>,
    timestamp: &str,
) -> String {
    format!(
        "Gate event: namespace={}, type={}, user={}, success={}, timestamp={}, details={}",
        namespace,
        event_type,
        format_sensitive(username),
        success,
        timestamp,
        details.unwrap_or("-")
    )
}
