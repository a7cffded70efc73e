//! Back-end state shared by every handler.

use crate::dir_picker::DirectoryPicker;
use buck2_cli_ops::Buck2CommandRunner;
use explorer_config_and_utils::Config;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared back-end state (cheap to clone).
#[derive(Clone)]
pub struct ExplorerState {
    /// Buck project directory every query runs in. The only mutable state.
    buck_dir: Arc<RwLock<String>>,
    pub runner: Arc<Buck2CommandRunner>,
    pub picker: Arc<dyn DirectoryPicker>,
}

impl ExplorerState {
    pub fn new(config: &Config, picker: Arc<dyn DirectoryPicker>) -> Self {
        let runner = match config.buck2_path.as_deref() {
            Some(path) => Buck2CommandRunner::with_executable(path),
            None => Buck2CommandRunner::new(),
        }
        .timeout_secs(config.command_timeout_secs);

        let buck_dir = config.resolve_initial_buck_dir();

        Self {
            buck_dir: Arc::new(RwLock::new(buck_dir)),
            runner: Arc::new(runner),
            picker,
        }
    }

    pub async fn buck_dir(&self) -> String {
        self.buck_dir.read().await.clone()
    }

    pub async fn set_buck_dir(&self, dir: String) {
        *self.buck_dir.write().await = dir;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::dir_picker::ScriptedPicker;
    use std::path::PathBuf;

    pub const MISSING_BUCK2: &str = "/definitely/not/here/buck2";

    /// State with a scripted picker and a buck2 path that does not exist.
    pub fn test_state(buck_dir: Option<PathBuf>, picker: Arc<ScriptedPicker>) -> ExplorerState {
        let config = Config {
            initial_buck_dir: buck_dir,
            buck2_path: Some(MISSING_BUCK2.to_string()),
            ..Config::default()
        };
        ExplorerState::new(&config, picker)
    }
}
