//! # Buck2 CLI Ops
//!
//! Typed `buck2` CLI orchestration for the explorer back end.
//!
//! Owns process execution, timeout control, output parsing, and error
//! normalization for the status and target query workflows.

mod command_runner;
mod error;
mod operations;
mod types;

pub use command_runner::{Buck2CommandRunner, CommandRunOutput, DEFAULT_TIMEOUT_SECS};
pub use error::Buck2CliOpsError;
pub use operations::{attributes, providers, status, targets};
pub use types::{ProvidersResult, TargetQuery};
