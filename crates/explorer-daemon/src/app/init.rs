//! Back-end startup.

use crate::app::ExplorerState;
use crate::dir_picker::RfdDirectoryPicker;
use crate::ipc::register_handlers;
use explorer_config_and_utils::{Config, Paths};
use explorer_ipc::{HandlerRegistry, IpcClient, IpcServer};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

/// Run the back end until SIGINT or SIGTERM.
pub async fn run_daemon(config: Config, paths: Paths) -> Result<(), Box<dyn std::error::Error>> {
    let socket_path = paths.socket_file();
    if socket_path.exists() {
        let client = IpcClient::new(&socket_path.to_string_lossy());
        if client.is_backend_running().await {
            return Err(
                "buck2-explorer is already running. Use 'buck2-explorer stop' to stop it first."
                    .into(),
            );
        }
        warn!(socket = %socket_path.display(), "Removing stale socket file");
        let _ = std::fs::remove_file(&socket_path);
    }

    paths.ensure_dirs()?;

    let pid = std::process::id();
    std::fs::write(paths.pid_file(), pid.to_string())?;
    info!(pid = pid, "buck2-explorer started");

    let state = ExplorerState::new(&config, Arc::new(RfdDirectoryPicker));
    info!(
        buck_dir = %state.buck_dir().await,
        buck2 = %state.runner.executable(),
        timeout_secs = config.command_timeout_secs,
        "Configuration loaded"
    );

    let registry = HandlerRegistry::new();
    register_handlers(&registry, state).await;

    let server = IpcServer::with_registry(&socket_path.to_string_lossy(), registry);

    let shutdown = server.shutdown_sender();
    tokio::spawn(async move {
        match wait_for_shutdown_signal().await {
            Ok(()) => {
                info!("Shutdown signal received");
                let _ = shutdown.send(());
            }
            Err(e) => error!(error = %e, "Failed to install signal handlers"),
        }
    });

    info!(socket = %socket_path.display(), "IPC server starting");
    let server_result = server.run().await;

    let _ = std::fs::remove_file(paths.pid_file());
    let _ = std::fs::remove_file(&socket_path);

    info!("buck2-explorer stopped");

    server_result.map_err(|e| e.into())
}

async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}
