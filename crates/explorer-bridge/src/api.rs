use crate::{BridgeError, BridgeResult, Transport};
use explorer_ipc::{IpcError, Operation, QueryArgs, Request};
use serde_json::Value;
use tracing::debug;

/// The six explorer operations, bound to a transport.
///
/// Every method sends exactly one request and returns the back end's
/// result or error as-is. Arguments are not validated here.
pub struct ExplorerApi<T> {
    transport: T,
}

impl<T: Transport> ExplorerApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The Buck project directory the back end is currently using.
    pub async fn current_buck_dir(&self) -> BridgeResult<String> {
        let value = self.forward(Request::new(Operation::CurrentBuckDir)).await?;
        match value {
            Value::String(dir) => Ok(dir),
            other => Err(protocol_violation(Operation::CurrentBuckDir, &other)),
        }
    }

    /// Ask the user to choose a Buck project directory.
    ///
    /// `None` means the user cancelled and the current directory is unchanged.
    pub async fn select_buck_dir(&self) -> BridgeResult<Option<String>> {
        let value = self.forward(Request::new(Operation::SelectBuckDir)).await?;
        match value {
            Value::Null => Ok(None),
            Value::String(dir) => Ok(Some(dir)),
            other => Err(protocol_violation(Operation::SelectBuckDir, &other)),
        }
    }

    pub async fn status(&self) -> BridgeResult<Value> {
        self.forward(Request::new(Operation::Status)).await
    }

    pub async fn targets(
        &self,
        target: &str,
        host: Option<&str>,
        mode: Option<&str>,
    ) -> BridgeResult<Value> {
        self.query(Operation::Targets, target, host, mode).await
    }

    pub async fn attributes(
        &self,
        target: &str,
        host: Option<&str>,
        mode: Option<&str>,
    ) -> BridgeResult<Value> {
        self.query(Operation::Attributes, target, host, mode).await
    }

    pub async fn providers(
        &self,
        target: &str,
        host: Option<&str>,
        mode: Option<&str>,
    ) -> BridgeResult<Value> {
        self.query(Operation::Providers, target, host, mode).await
    }

    async fn query(
        &self,
        operation: Operation,
        target: &str,
        host: Option<&str>,
        mode: Option<&str>,
    ) -> BridgeResult<Value> {
        let params = QueryArgs::new(target, host, mode).to_params();
        self.forward(Request::with_params(operation, params)).await
    }

    async fn forward(&self, request: Request) -> BridgeResult<Value> {
        let operation = request.method;
        let request_id = request.id.clone();
        debug!(operation = %operation, request_id = %request_id, "Forwarding");

        let response = self.transport.invoke(request).await?;
        response.into_result().map_err(BridgeError::Backend)
    }
}

/// A directory operation answered with something other than a path.
fn protocol_violation(operation: Operation, result: &Value) -> BridgeError {
    BridgeError::Transport(IpcError::Protocol(format!(
        "{operation} returned {result}"
    )))
}
