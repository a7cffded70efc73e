use thiserror::Error;

/// Error taxonomy for buck2 CLI orchestration.
#[derive(Debug, Error)]
pub enum Buck2CliOpsError {
    #[error("buck2 is not installed: {executable}")]
    Buck2NotInstalled { executable: String },

    #[error("Not inside a Buck2 project: {message}")]
    NotABuckProject {
        message: String,
        exit_code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    #[error("Invalid target: {message}")]
    InvalidTarget {
        message: String,
        exit_code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("buck2 command failed: {message}")]
    CommandFailed {
        message: String,
        exit_code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    #[error("buck2 command timed out after {timeout_secs}s: {command}")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("Failed to parse buck2 output: {message}")]
    ParseError { message: String },
}

impl Buck2CliOpsError {
    /// Stable machine-readable error code for IPC clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Buck2NotInstalled { .. } => "buck2_not_installed",
            Self::NotABuckProject { .. } => "not_a_buck_project",
            Self::InvalidTarget { .. } => "invalid_target",
            Self::InvalidParams { .. } => "invalid_params",
            Self::CommandFailed { .. } => "command_failed",
            Self::Timeout { .. } => "timeout",
            Self::ParseError { .. } => "parse_error",
        }
    }

    /// Structured detail attached to IPC error responses.
    pub fn details(&self) -> serde_json::Value {
        let mut details = serde_json::json!({ "code": self.code() });
        match self {
            Self::CommandFailed {
                exit_code,
                stderr,
                stdout,
                ..
            }
            | Self::NotABuckProject {
                exit_code,
                stderr,
                stdout,
                ..
            }
            | Self::InvalidTarget {
                exit_code,
                stderr,
                stdout,
                ..
            } => {
                details["exit_code"] = serde_json::json!(exit_code);
                details["stderr"] = serde_json::json!(stderr);
                details["stdout"] = serde_json::json!(stdout);
            }
            Self::Timeout { timeout_secs, .. } => {
                details["timeout_secs"] = serde_json::json!(timeout_secs);
            }
            Self::Buck2NotInstalled { executable } => {
                details["executable"] = serde_json::json!(executable);
            }
            _ => {}
        }
        details
    }
}
