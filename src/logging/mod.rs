//! Structured, non-blocking logging for datastream.
//!
//! Callers enqueue severity-tagged entries and return immediately. A
//! background task drains the queue on a fixed interval and appends each
//! batch to the current day's file in `log_dir`:
//!
//! ```text
//! logs/stream_2026-10-19.log
//! [2026-10-19 14:03:07.412][INF][RecordStore] Successfully wrote 10000 rows to customers.csv
//! ```
//!
//! Nothing in this module returns an error to the caller. Flush failures are
//! counted and swallowed so a full disk never takes the engine down with it.

mod entry;
mod logger;


pub use entry::{LogEntry, Severity};
pub use logger::{Logger, LoggerConfig};
