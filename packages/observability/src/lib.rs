//! # Observability
//!
//! Structured logging for the Buck2 explorer back end.
//!
//! Processes call [`init_with_config`] once at startup and then use the
//! ordinary `tracing` macros. Every event is appended as one JSON object per
//! line to a central log file, `~/.buck2-explorer/logs/dev.jsonl` unless a
//! path is configured, so the stream can be followed with
//! `tail -f ... | jq`.
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "buck2-explorer".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! })?;
//! tracing::info!("ready");
//! ```

mod dev;
mod json_layer;

use std::path::PathBuf;

pub use dev::{default_log_path, LogFileWriter};
pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name written into every log line as `service`.
    pub service_name: String,

    /// Default filter (e.g. "debug", "info", or a full directive such as
    /// "explorer_ipc=trace,info"). `RUST_LOG` wins when set.
    pub default_level: String,

    /// Log file path. Defaults to [`default_log_path`].
    pub log_path: Option<PathBuf>,

    /// Also emit compact human-readable lines on stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize logging and return the path of the log file in use.
///
/// Fails when the log file cannot be opened. Installing a second global
/// subscriber is not an error; the first one stays active.
pub fn init_with_config(config: LogConfig) -> std::io::Result<PathBuf> {
    dev::init_subscriber(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }
}
