//! Boundary decoding of raw request lines.
//!
//! Every line is checked against the closed [`Operation`] set before a
//! [`Request`] is produced, so a rejection can still echo the caller's
//! request id and say *why* it was rejected.

use crate::{error_codes, Operation, Request, Response};

/// Why a raw line could not become a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// Request id, when one could be recovered from the line.
    pub id: Option<String>,
    pub code: i32,
    pub message: String,
}

impl DecodeError {
    fn new(id: Option<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            id,
            code,
            message: message.into(),
        }
    }

    /// Error response addressed to the recovered id (or `""`).
    pub fn into_response(self) -> Response {
        Response::error(self.id.as_deref().unwrap_or(""), self.code, &self.message)
    }
}

/// Decode one request line.
pub fn decode_request(line: &str) -> Result<Request, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| DecodeError::new(None, error_codes::PARSE_ERROR, format!("Parse error: {}", e)))?;

    let object = value.as_object().ok_or_else(|| {
        DecodeError::new(
            None,
            error_codes::INVALID_REQUEST,
            "request must be a JSON object",
        )
    })?;

    let id = match object.get("id").and_then(|v| v.as_str()) {
        Some(id) => id.to_string(),
        None => {
            return Err(DecodeError::new(
                None,
                error_codes::INVALID_REQUEST,
                "request id must be a string",
            ))
        }
    };

    let method = match object.get("method").and_then(|v| v.as_str()) {
        Some(method) => method,
        None => {
            return Err(DecodeError::new(
                Some(id),
                error_codes::INVALID_REQUEST,
                "request method must be a string",
            ))
        }
    };

    if Operation::from_wire_name(method).is_none() {
        return Err(DecodeError::new(
            Some(id),
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        DecodeError::new(
            Some(id),
            error_codes::INVALID_REQUEST,
            format!("Invalid request: {}", e),
        )
    })
}
