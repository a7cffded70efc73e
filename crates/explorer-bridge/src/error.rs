use explorer_ipc::{ErrorInfo, IpcError};
use thiserror::Error;

/// Failure of a bridge call as seen by the front end.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The back end could not be reached or the exchange broke off.
    #[error("Transport error: {0}")]
    Transport(#[from] IpcError),

    /// The back end answered with an error. Forwarded unchanged.
    #[error("Back end error {}: {}", .0.code, .0.message)]
    Backend(ErrorInfo),
}

impl BridgeError {
    /// The back end's error payload, if this is a back-end error.
    pub fn backend_error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Backend(info) => Some(info),
            _ => None,
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
