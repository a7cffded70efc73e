//! Front-end facade for the explorer command bridge.
//!
//! [`ExplorerApi`] is the only surface the restricted front end sees: six
//! fixed operations, each forwarded once through a [`Transport`] to the
//! privileged back end. Nothing here spawns processes or touches the file
//! system.

mod api;
mod error;
mod transport;

pub use api::ExplorerApi;
pub use error::{BridgeError, BridgeResult};
pub use transport::{LocalTransport, Transport};
