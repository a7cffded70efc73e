//! `buck2-explorer invoke`: run one operation through the facade.
//!
//! Talks to the running back end over its socket. When none is running the
//! handlers are served in-process instead.

use crate::app::ExplorerState;
use crate::dir_picker::RfdDirectoryPicker;
use crate::ipc::register_handlers;
use explorer_bridge::{BridgeError, BridgeResult, ExplorerApi, LocalTransport, Transport};
use explorer_config_and_utils::{Config, Paths};
use explorer_ipc::{HandlerRegistry, IpcClient, Operation};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub struct InvokeArgs {
    pub operation: Operation,
    pub target: Option<String>,
    pub host: Option<String>,
    pub mode: Option<String>,
}

/// Accepts wire names (`buck2-targets`) as well as the short facade names
/// (`targets`, `current_buck_dir`).
pub fn parse_operation(raw: &str) -> Result<Operation, String> {
    let raw = raw.trim();
    if let Some(operation) = Operation::from_wire_name(raw) {
        return Ok(operation);
    }

    let normalized = raw.replace('_', "-");
    Operation::ALL
        .into_iter()
        .find(|op| {
            let wire = op.wire_name();
            wire == normalized || wire.strip_prefix("buck2-") == Some(normalized.as_str())
        })
        .ok_or_else(|| {
            let known: Vec<&str> = Operation::ALL.iter().map(|op| op.wire_name()).collect();
            format!("unknown operation '{}' (expected one of: {})", raw, known.join(", "))
        })
}

pub async fn run_invoke(
    config: Config,
    paths: Paths,
    args: InvokeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.operation.takes_query_args() && args.target.is_none() {
        return Err(format!("{} requires a target", args.operation).into());
    }

    let client = IpcClient::new(&paths.socket_file().to_string_lossy());
    let result = if client.is_backend_running().await {
        debug!(socket = %client.socket_path(), "Invoking through running back end");
        call(&ExplorerApi::new(client), &args).await
    } else {
        debug!("No back end running, serving in-process");
        let registry = HandlerRegistry::new();
        let state = ExplorerState::new(&config, Arc::new(RfdDirectoryPicker));
        register_handlers(&registry, state).await;
        call(&ExplorerApi::new(LocalTransport::new(registry)), &args).await
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(BridgeError::Backend(info)) => {
            eprintln!("{}", serde_json::to_string_pretty(&info)?);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

async fn call<T: Transport>(api: &ExplorerApi<T>, args: &InvokeArgs) -> BridgeResult<Value> {
    let target = args.target.as_deref().unwrap_or_default();
    let host = args.host.as_deref();
    let mode = args.mode.as_deref();

    match args.operation {
        Operation::CurrentBuckDir => api.current_buck_dir().await.map(Value::String),
        Operation::SelectBuckDir => Ok(api
            .select_buck_dir()
            .await?
            .map(Value::String)
            .unwrap_or(Value::Null)),
        Operation::Status => api.status().await,
        Operation::Targets => api.targets(target, host, mode).await,
        Operation::Attributes => api.attributes(target, host, mode).await,
        Operation::Providers => api.providers(target, host, mode).await,
    }
}
