//! Configuration model for datastream.
//!
//! This module defines the `StreamConfig` struct that represents `datastream.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for every field, and validation of config values.

mod model;
mod operations;


// Re-export public API
pub use model::{DEFAULT_CONFIG_FILE, StreamConfig};
