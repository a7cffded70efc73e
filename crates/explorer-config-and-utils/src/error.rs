use thiserror::Error;

/// Errors raised while setting up the back end (config, paths, log file).
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The base directory could not be resolved, e.g. no home directory.
    #[error("cannot resolve runtime path: {0}")]
    Path(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
