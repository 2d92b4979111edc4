//! Exit code constants for the datastream CLI.
//!
//! - 0: Success (including a graceful stop on Ctrl+C)
//! - 1: Runtime failure (bootstrap write failed, unexpected I/O)
//! - 2: Configuration error
//! - 4: Lock acquisition failure

/// Successful execution or graceful shutdown.
pub const SUCCESS: i32 = 0;

/// Runtime failure: a fatal write or I/O fault terminated the run.
pub const RUNTIME_FAILURE: i32 = 1;

/// Configuration could not be read, parsed, or validated.
pub const CONFIG_ERROR: i32 = 2;

/// A resource lock could not be acquired within its timeout.
pub const LOCK_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, RUNTIME_FAILURE, CONFIG_ERROR, LOCK_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn graceful_stop_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
