//! IPC layer between the restricted explorer front end and the privileged
//! back end.
//!
//! This crate provides:
//! - Unix domain socket server and client
//! - A handler registry keyed by the closed `Operation` set
//! - NDJSON request/response framing

mod error;
mod registry;
mod server;

pub use error::{IpcError, IpcResult};
pub use explorer_protocol_types::{
    decode_request, error_codes, DecodeError, ErrorInfo, Operation, QueryArgs, Request, Response,
};
pub use registry::{HandlerFn, HandlerRegistry};
pub use server::{IpcClient, IpcServer, MAX_REQUEST_LINE_BYTES};
