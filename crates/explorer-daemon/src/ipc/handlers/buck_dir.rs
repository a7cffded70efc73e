//! Buck project directory handlers.

use crate::app::ExplorerState;
use explorer_ipc::{HandlerRegistry, Operation, Response};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Register the current/select directory handlers.
pub async fn register(registry: &HandlerRegistry, state: ExplorerState) {
    register_current_buck_dir(registry, state.clone()).await;
    register_select_buck_dir(registry, state).await;
}

pub async fn current_buck_dir_core(state: &ExplorerState) -> serde_json::Value {
    serde_json::Value::String(state.buck_dir().await)
}

/// Open the picker at the current directory and adopt the choice.
///
/// Returns the chosen path, or `null` when the user cancels; cancelling
/// leaves the current directory as it was.
pub async fn select_buck_dir_core(state: &ExplorerState) -> serde_json::Value {
    let current = state.buck_dir().await;
    let start = (!current.is_empty()).then(|| PathBuf::from(&current));

    match state.picker.pick_directory(start.as_deref()).await {
        Some(path) => {
            let dir = path.to_string_lossy().to_string();
            if !looks_like_buck_project(&path) {
                warn!(dir = %dir, "Selected directory has no .buckconfig");
            }
            state.set_buck_dir(dir.clone()).await;
            info!(dir = %dir, "Buck directory selected");
            serde_json::Value::String(dir)
        }
        None => {
            debug!("Directory selection cancelled");
            serde_json::Value::Null
        }
    }
}

fn looks_like_buck_project(dir: &Path) -> bool {
    dir.join(".buckconfig").exists()
}

async fn register_current_buck_dir(registry: &HandlerRegistry, state: ExplorerState) {
    registry
        .register(Operation::CurrentBuckDir, move |req| {
            let state = state.clone();
            async move { Response::success(&req.id, current_buck_dir_core(&state).await) }
        })
        .await;
}

async fn register_select_buck_dir(registry: &HandlerRegistry, state: ExplorerState) {
    registry
        .register(Operation::SelectBuckDir, move |req| {
            let state = state.clone();
            async move { Response::success(&req.id, select_buck_dir_core(&state).await) }
        })
        .await;
}
