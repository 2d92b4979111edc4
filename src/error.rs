//! Error types for the datastream engine.
//!
//! Uses thiserror for derive macros. The lock manager and record store raise
//! these upward unchanged; only the streaming loop is allowed to swallow them.

use crate::exit_codes;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for datastream operations.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The resource stayed busy longer than the configured wait.
    #[error("failed to acquire lock on '{resource}' within {}ms", .timeout.as_millis())]
    LockTimeout { resource: String, timeout: Duration },

    /// The caller gave up; not a fault.
    #[error("operation cancelled")]
    Cancelled,

    /// An I/O fault while serializing or publishing a target file.
    #[error("atomic write failed for '{}': {source}", .path.display())]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lock manager was torn down before the request arrived.
    #[error("lock manager is closed; cannot acquire '{0}'")]
    Closed(String),

    /// Configuration could not be read, parsed, or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// Any other I/O failure outside the record store's write path.
    #[error("{0}")]
    Io(String),
}

impl StreamError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            StreamError::Cancelled => exit_codes::SUCCESS,
            StreamError::LockTimeout { .. } => exit_codes::LOCK_FAILURE,
            StreamError::Config(_) => exit_codes::CONFIG_ERROR,
            StreamError::AtomicWrite { .. } | StreamError::Closed(_) | StreamError::Io(_) => {
                exit_codes::RUNTIME_FAILURE
            }
        }
    }

    /// Whether a later attempt at the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::LockTimeout { .. } | StreamError::AtomicWrite { .. }
        )
    }

    /// Wrap an I/O error that hit `path` during a store write.
    pub(crate) fn atomic_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StreamError::AtomicWrite {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for datastream operations.
pub type Result<T> = std::result::Result<T, StreamError>;
