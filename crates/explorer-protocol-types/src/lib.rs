//! Command-bridge protocol definitions.
//!
//! A JSON-RPC-like, newline-delimited protocol. The set of callable
//! operations is the closed [`Operation`] enum; there is no dynamic method
//! lookup anywhere on the wire path.

mod decode;
mod operation;
mod params;

pub use decode::{decode_request, DecodeError};
pub use operation::Operation;
pub use params::QueryArgs;

use serde::{Deserialize, Serialize};

/// One call across the bridge: a fixed operation plus optional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Correlates the response; a fresh UUID per call.
    pub id: String,
    pub method: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Request {
    pub fn new(method: Operation) -> Self {
        Self::build(method, None)
    }

    pub fn with_params(method: Operation, params: serde_json::Value) -> Self {
        Self::build(method, Some(params))
    }

    fn build(method: Operation, params: Option<serde_json::Value>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// The back end's answer: exactly one of `result` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Failure payload, forwarded to the front end untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// JSON-RPC style code, see [`error_codes`].
    pub code: i32,
    pub message: String,
    /// Machine-readable details, e.g. `{"code": "invalid_target", "stderr": ...}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    /// A `null` result is kept as `Some(Value::Null)` so that it still
    /// round-trips as a success.
    pub fn success(id: &str, result: serde_json::Value) -> Self {
        Self {
            id: id.to_owned(),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: &str, code: i32, message: &str) -> Self {
        Self::failure(id, code, message, None)
    }

    pub fn error_with_data(id: &str, code: i32, message: &str, data: serde_json::Value) -> Self {
        Self::failure(id, code, message, Some(data))
    }

    fn failure(id: &str, code: i32, message: &str, data: Option<serde_json::Value>) -> Self {
        let error = ErrorInfo {
            code,
            message: message.to_owned(),
            data,
        };
        Self {
            id: id.to_owned(),
            result: None,
            error: Some(error),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Split into the success value or the error payload.
    ///
    /// A success whose `result` field was omitted on the wire (a `null`
    /// result serialized by a peer that drops nulls) yields `Value::Null`.
    pub fn into_result(self) -> Result<serde_json::Value, ErrorInfo> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(serde_json::Value::Null)),
        }
    }
}

/// Error codes carried in [`ErrorInfo::code`].
pub mod error_codes {
    /// The line was not valid JSON.
    pub const PARSE_ERROR: i32 = -32700;
    /// Valid JSON, but not a request object with `id` and `method`.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method outside the operation set, or no handler registered.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Unknown target or no Buck project.
    pub const NOT_FOUND: i32 = -32002;
    /// The buck2 executable could not be started.
    pub const TOOL_UNAVAILABLE: i32 = -32010;
    pub const TIMEOUT: i32 = -32011;
}
