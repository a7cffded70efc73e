//! Handler registration for the IPC server.

use crate::app::ExplorerState;
use crate::ipc::handlers;
use explorer_ipc::HandlerRegistry;
use tracing::{info, warn};

/// Register a handler for every explorer operation.
pub async fn register_handlers(registry: &HandlerRegistry, state: ExplorerState) {
    handlers::buck_dir::register(registry, state.clone()).await;
    handlers::buck2::register(registry, state).await;

    let missing = registry.missing().await;
    if missing.is_empty() {
        info!("All IPC handlers registered");
    } else {
        warn!(?missing, "Some operations have no handler");
    }
}
