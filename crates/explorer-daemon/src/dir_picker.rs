//! Native folder selection behind a trait.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Asks the user for a directory. `None` means the user cancelled.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    async fn pick_directory(&self, start: Option<&Path>) -> Option<PathBuf>;
}

/// Native dialog via `rfd`.
pub struct RfdDirectoryPicker;

#[async_trait]
impl DirectoryPicker for RfdDirectoryPicker {
    async fn pick_directory(&self, start: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = rfd::AsyncFileDialog::new().set_title("Select Buck2 project directory");
        if let Some(dir) = start {
            dialog = dialog.set_directory(dir);
        }
        dialog
            .pick_folder()
            .await
            .map(|handle| handle.path().to_path_buf())
    }
}

/// Returns queued answers in order, then cancels. Records the start dirs.
#[cfg(test)]
pub struct ScriptedPicker {
    answers: std::sync::Mutex<std::collections::VecDeque<Option<PathBuf>>>,
    starts: std::sync::Mutex<Vec<Option<PathBuf>>>,
}

#[cfg(test)]
impl ScriptedPicker {
    pub fn new(answers: Vec<Option<PathBuf>>) -> Self {
        Self {
            answers: std::sync::Mutex::new(answers.into()),
            starts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn starts(&self) -> Vec<Option<PathBuf>> {
        self.starts.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl DirectoryPicker for ScriptedPicker {
    async fn pick_directory(&self, start: Option<&Path>) -> Option<PathBuf> {
        self.starts
            .lock()
            .unwrap()
            .push(start.map(Path::to_path_buf));
        self.answers.lock().unwrap().pop_front().flatten()
    }
}
