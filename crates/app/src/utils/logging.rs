use std::time::Duration;

use openbooks_domain::BooksError;
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"drafts::create_draft"`).
/// * `elapsed` - Duration the command execution took.
/// * `success` - Whether the command completed successfully.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, "command_execution_failure");
    }
}

/// Convert a `BooksError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &BooksError) -> &'static str {
    match error {
        BooksError::Database(_) => "database",
        BooksError::Config(_) => "config",
        BooksError::Network(_) => "network",
        BooksError::NotFound(_) => "not_found",
        BooksError::InvalidInput(_) => "invalid_input",
        BooksError::Serialization(_) => "serialization",
        BooksError::Internal(_) => "internal",
    }
}

/// Initialise the tracing subscriber from `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
