//! Core types, configuration, and utilities for the Buck2 explorer back end.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_LOG_LEVEL};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level, SERVICE_NAME};
pub use paths::Paths;
