//! IPC handler implementations.
//!
//! Each handler module keeps a `*_core` function with the operation logic
//! and a thin registration wrapper that turns it into a wire response.

pub mod buck2;
pub mod buck_dir;
