//! IPC server and client over a Unix domain socket.
//!
//! Each connection carries NDJSON request lines. Every decoded request is
//! dispatched on its own task, so one slow `buck2` invocation never holds up
//! another request on the same connection; responses are correlated by id.

use crate::{
    decode_request, error_codes, HandlerRegistry, IpcError, IpcResult, Operation, Request,
    Response,
};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

/// Longest request line the server accepts, excluding the newline.
pub const MAX_REQUEST_LINE_BYTES: usize = 1024 * 1024;

/// Serves the explorer operations on a Unix domain socket.
pub struct IpcServer {
    socket_path: String,
    registry: HandlerRegistry,
    shutdown_tx: broadcast::Sender<()>,
}

impl IpcServer {
    pub fn new(socket_path: &str) -> Self {
        Self::with_registry(socket_path, HandlerRegistry::new())
    }

    /// Create a server that serves an existing registry.
    pub fn with_registry(socket_path: &str, registry: HandlerRegistry) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            socket_path: socket_path.to_string(),
            registry,
            shutdown_tx,
        }
    }

    /// Register a handler for an operation.
    pub async fn register_handler<F, Fut>(&self, operation: Operation, handler: F)
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.registry.register(operation, handler).await;
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Get a shutdown sender (for signal handlers that need to trigger shutdown).
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Trigger shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Accept connections until shutdown is signalled.
    pub async fn run(&self) -> IpcResult<()> {
        // Stale socket from a previous run
        let socket_path = Path::new(&self.socket_path);
        if socket_path.exists() {
            std::fs::remove_file(socket_path)?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let missing = self.registry.missing().await;
        if !missing.is_empty() {
            warn!(?missing, "Serving with unregistered operations");
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!(path = %self.socket_path, "Bridge socket listening");

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, _)) => {
                            let registry = self.registry.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, registry).await {
                                    error!(error = %e, "Connection error");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Accept error");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Bridge socket shutting down");
                    break;
                }
            }
        }

        // Cleanup socket file
        let _ = std::fs::remove_file(&self.socket_path);

        Ok(())
    }
}

/// Serve one connection: one request per line, answered as each finishes.
async fn handle_connection(stream: UnixStream, registry: HandlerRegistry) -> IpcResult<()> {
    let (reader, writer) = stream.into_split();
    let writer = Arc::new(Mutex::new(writer));
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    debug!("Client connected");

    loop {
        buf.clear();
        let bytes_read = (&mut reader)
            .take(MAX_REQUEST_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await?;

        if bytes_read == 0 {
            debug!("Client disconnected");
            break;
        }

        if buf.len() > MAX_REQUEST_LINE_BYTES && buf.last() != Some(&b'\n') {
            // The rest of the line is unbounded; answer and drop the connection.
            warn!(limit = MAX_REQUEST_LINE_BYTES, "Request line too long");
            let response = Response::error(
                "",
                error_codes::INVALID_REQUEST,
                &format!("request line exceeds {} bytes", MAX_REQUEST_LINE_BYTES),
            );
            write_response(&writer, &response).await?;
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Rejected non-UTF-8 request line");
                let response = Response::error(
                    "",
                    error_codes::PARSE_ERROR,
                    &format!("Parse error: request is not valid UTF-8: {}", e),
                );
                write_response(&writer, &response).await?;
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!(request = %trimmed, "Received request");

        let request = match decode_request(trimmed) {
            Ok(req) => req,
            Err(rejection) => {
                warn!(code = rejection.code, message = %rejection.message, "Rejected request");
                write_response(&writer, &rejection.into_response()).await?;
                continue;
            }
        };

        let registry = registry.clone();
        let writer = writer.clone();
        tokio::spawn(async move {
            let response = registry.dispatch(request).await;
            if let Err(e) = write_response(&writer, &response).await {
                debug!(error = %e, "Failed to write response, client gone");
            }
        });
    }

    Ok(())
}

async fn write_response(writer: &Mutex<OwnedWriteHalf>, response: &Response) -> IpcResult<()> {
    let mut response_json = response.to_json()?;
    debug!(response = %response_json, "Sending response");
    response_json.push('\n');

    let mut writer = writer.lock().await;
    writer.write_all(response_json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// IPC client for connecting to the explorer back end.
#[derive(Debug, Clone)]
pub struct IpcClient {
    socket_path: String,
}

impl IpcClient {
    pub fn new(socket_path: &str) -> Self {
        Self {
            socket_path: socket_path.to_string(),
        }
    }

    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Send a request and wait for its response.
    ///
    /// Each call uses its own connection, so concurrent calls never share
    /// a stream.
    pub async fn call(&self, request: Request) -> IpcResult<Response> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| IpcError::Socket(format!("{}: {}", self.socket_path, e)))?;

        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        // Send request
        let mut request_json = request.to_json()?;
        request_json.push('\n');
        writer.write_all(request_json.as_bytes()).await?;
        writer.flush().await?;

        // Read response
        let mut line = String::new();
        reader.read_line(&mut line).await?;

        if line.is_empty() {
            return Err(IpcError::ConnectionClosed);
        }

        let response = Response::from_json(line.trim())?;
        if response.id != request.id {
            return Err(IpcError::Protocol(format!(
                "response id {} does not match request id {}",
                response.id, request.id
            )));
        }
        Ok(response)
    }

    /// Send an operation with no parameters.
    pub async fn call_operation(&self, operation: Operation) -> IpcResult<Response> {
        self.call(Request::new(operation)).await
    }

    /// Check whether a back end is answering on the socket.
    pub async fn is_backend_running(&self) -> bool {
        self.call_operation(Operation::CurrentBuckDir).await.is_ok()
    }
}
