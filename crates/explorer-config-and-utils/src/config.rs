//! Configuration management for the explorer back end.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default timeout for a single buck2 invocation.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 120;

/// Back-end configuration, stored as JSON in `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Explicit buck2 executable. Discovered from `BUCK2_PATH`/`PATH` when unset.
    #[serde(default)]
    pub buck2_path: Option<String>,
    /// Buck project directory reported before any selection is made.
    /// Defaults to the process working directory.
    #[serde(default)]
    pub initial_buck_dir: Option<PathBuf>,
    /// Timeout for a single buck2 invocation, in seconds.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            buck2_path: None,
            initial_buck_dir: None,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults.
    /// Environment variables win over the file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.command_timeout_secs == 0 {
            return Err(CoreError::Config(
                "command_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(CoreError::Config("log_level must not be empty".to_string()));
        }
        Ok(())
    }

    /// The directory `current-buck-dir` reports before any selection.
    ///
    /// Configured directory first, then the process working directory, and
    /// an empty string when neither is available.
    pub fn resolve_initial_buck_dir(&self) -> String {
        if let Some(dir) = &self.initial_buck_dir {
            return dir.to_string_lossy().to_string();
        }
        std::env::current_dir()
            .map(|dir| dir.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("BUCK2_EXPLORER_LOG_LEVEL") {
            if !log_level.trim().is_empty() {
                self.log_level = log_level;
            }
        }
        if let Ok(dir) = std::env::var("BUCK2_EXPLORER_BUCK_DIR") {
            if !dir.trim().is_empty() {
                self.initial_buck_dir = Some(PathBuf::from(dir));
            }
        }
    }
}
