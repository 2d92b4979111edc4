//! StreamConfig struct definition and default implementation.

use crate::logging::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "datastream.yaml";

/// Configuration for the streaming engine.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    // =========================================================================
    // Layout
    // =========================================================================
    /// Directory holding one CSV file per resource.
    pub output_dir: PathBuf,

    /// Directory holding one log file per calendar day.
    pub log_dir: PathBuf,

    // =========================================================================
    // Bootstrap volume
    // =========================================================================
    pub total_customers: usize,
    pub total_invoices: usize,
    pub total_loans: usize,

    // =========================================================================
    // Streaming
    // =========================================================================
    /// Period between streaming ticks.
    pub refresh_interval_ms: u64,

    /// Upper bound on records appended in one cycle.
    pub max_entries_per_cycle: usize,

    /// Stop after this many streaming cycles (unbounded when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cycles: Option<u64>,

    /// Seed for the synthetic record factory (entropy when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    // =========================================================================
    // Store
    // =========================================================================
    /// How long a writer waits for a resource lock.
    pub lock_timeout_ms: u64,

    /// Publish full writes by rename. When false, the side file is copied over
    /// the target and then deleted.
    pub atomic_write: bool,

    /// Rows between buffer flushes during a full write.
    pub flush_every_rows: usize,

    // =========================================================================
    // Logging
    // =========================================================================
    /// Entries below this severity are dropped before they are queued.
    pub log_level: Severity,

    /// Mirror log entries to stderr.
    pub console_output: bool,

    pub log_flush_interval_ms: u64,

    /// Entries beyond this many pending are dropped and counted.
    pub log_queue_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            log_dir: PathBuf::from("logs"),
            total_customers: 10_000,
            total_invoices: 10_000,
            total_loans: 5_000,
            refresh_interval_ms: 3_000,
            max_entries_per_cycle: 500,
            max_cycles: None,
            seed: None,
            lock_timeout_ms: 5_000,
            atomic_write: true,
            flush_every_rows: 5_000,
            log_level: Severity::Information,
            console_output: true,
            log_flush_interval_ms: 500,
            log_queue_capacity: 100_000,
        }
    }
}

impl StreamConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn log_flush_interval(&self) -> Duration {
        Duration::from_millis(self.log_flush_interval_ms)
    }
}
