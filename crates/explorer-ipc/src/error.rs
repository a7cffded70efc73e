use thiserror::Error;

/// Failures of the socket transport itself, as opposed to operation errors
/// that travel inside a [`Response`](crate::Response).
#[derive(Error, Debug)]
pub enum IpcError {
    #[error("bridge socket I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed bridge message: {0}")]
    Json(#[from] serde_json::Error),

    /// The peer answered, but not with the response we asked for.
    #[error("bridge protocol violation: {0}")]
    Protocol(String),

    /// Could not connect to the back-end socket.
    #[error("back end unreachable: {0}")]
    Socket(String),

    #[error("back end closed the connection before answering")]
    ConnectionClosed,
}

pub type IpcResult<T> = Result<T, IpcError>;
