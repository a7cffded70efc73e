//! Logging initialization for the explorer back end.
//!
//! Thin wrapper over the observability crate: structured JSONL lands in
//! `<base>/logs/dev.jsonl` with `service = "buck2-explorer"` on every line.

use crate::{CoreResult, Paths};
use std::path::PathBuf;

/// Service name written into every log line.
pub const SERVICE_NAME: &str = "buck2-explorer";

/// Initialize the logging system.
///
/// `level` is either a plain level name (case-insensitive, `warning` is
/// accepted) or a full `tracing` filter directive, which is passed through
/// untouched. `RUST_LOG` overrides both. Returns the log file path.
pub fn init_logging(level: &str, paths: &Paths, also_stderr: bool) -> CoreResult<PathBuf> {
    let default_level = match parse_level(level) {
        Some(level) => level.as_str().to_ascii_lowercase(),
        None => level.trim().to_string(),
    };

    let path = observability::init_with_config(observability::LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level,
        log_path: Some(paths.log_file()),
        also_stderr,
    })?;
    Ok(path)
}

/// Parse a plain log level name.
pub fn parse_level(level: &str) -> Option<tracing::Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(tracing::Level::TRACE),
        "debug" => Some(tracing::Level::DEBUG),
        "info" => Some(tracing::Level::INFO),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "error" => Some(tracing::Level::ERROR),
        _ => None,
    }
}
