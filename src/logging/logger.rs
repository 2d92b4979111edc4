//! Queue-backed logger with a periodic background flush.

use super::entry::{LogEntry, Severity};
use crate::config::StreamConfig;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Settings for a `Logger`.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    pub min_severity: Severity,
    pub console: bool,
    pub flush_interval: Duration,
    pub queue_capacity: usize,
}

impl LoggerConfig {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            min_severity: Severity::Information,
            console: false,
            flush_interval: Duration::from_millis(500),
            queue_capacity: 100_000,
        }
    }

    pub fn from_stream_config(config: &StreamConfig) -> Self {
        Self {
            log_dir: config.log_dir.clone(),
            min_severity: config.log_level,
            console: config.console_output,
            flush_interval: config.log_flush_interval(),
            queue_capacity: config.log_queue_capacity,
        }
    }
}

/// Work for the console writer thread, in enqueue order.
#[derive(Debug)]
enum ConsoleMessage {
    Line(Severity, String),
    /// Acknowledged once every earlier line has been written.
    Drained(oneshot::Sender<()>),
}

#[derive(Debug)]
struct Shared {
    config: LoggerConfig,
    queue: Mutex<VecDeque<LogEntry>>,
    /// Feeds the console writer thread; `None` when mirroring is off.
    console: Option<mpsc::Sender<ConsoleMessage>>,
    /// Serializes flushes so timer ticks and shutdown never interleave batches.
    write_lock: tokio::sync::Mutex<()>,
    closed: AtomicBool,
    dropped: AtomicU64,
    flush_failures: AtomicU64,
    stop: CancellationToken,
    flush_task: Mutex<Option<JoinHandle<()>>>,
}

/// Cheaply cloneable handle to the engine's log.
///
/// Every logging call enqueues and returns; none of them can fail.
#[derive(Debug, Clone)]
pub struct Logger {
    shared: Arc<Shared>,
}

impl Logger {
    /// Create the logger and spawn its flush task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(config: LoggerConfig) -> Self {
        let flush_interval = config.flush_interval;
        let console = if config.console {
            spawn_console_writer()
        } else {
            None
        };
        let shared = Arc::new(Shared {
            config,
            queue: Mutex::new(VecDeque::new()),
            console,
            write_lock: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            flush_failures: AtomicU64::new(0),
            stop: CancellationToken::new(),
            flush_task: Mutex::new(None),
        });

        let task = tokio::spawn(flush_loop(Arc::clone(&shared), flush_interval));
        *shared.flush_task.lock() = Some(task);

        Self { shared }
    }

    pub fn debug(&self, message: impl Into<String>, context: Option<&str>) {
        self.log(Severity::Debug, message, context);
    }

    pub fn info(&self, message: impl Into<String>, context: Option<&str>) {
        self.log(Severity::Information, message, context);
    }

    pub fn warning(&self, message: impl Into<String>, context: Option<&str>) {
        self.log(Severity::Warning, message, context);
    }

    pub fn error(&self, message: impl Into<String>, context: Option<&str>) {
        self.log(Severity::Error, message, context);
    }

    /// Log an error together with the fault that caused it.
    pub fn error_with(
        &self,
        message: impl Into<String>,
        cause: &dyn std::error::Error,
        context: Option<&str>,
    ) {
        let message = format!("{} | cause: {}", message.into(), cause);
        self.log(Severity::Error, message, context);
    }

    /// Enqueue one entry.
    ///
    /// Entries below the configured threshold are dropped here. Console lines
    /// are handed to the writer thread under the queue lock, so console order
    /// matches file order; the stderr write itself never holds the queue.
    pub fn log(&self, severity: Severity, message: impl Into<String>, context: Option<&str>) {
        let config = &self.shared.config;
        if severity < config.min_severity {
            return;
        }

        let entry = LogEntry::new(severity, message, context);
        let console_line = self.shared.console.as_ref().map(|tx| (tx, entry.render()));
        let mut queue = self.shared.queue.lock();

        if let Some((tx, line)) = console_line {
            let _ = tx.send(ConsoleMessage::Line(severity, line));
        }

        if self.shared.closed.load(Ordering::Acquire) || queue.len() >= config.queue_capacity {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        queue.push_back(entry);
    }

    /// Drain the queue to disk now. Failures are counted, never returned.
    pub async fn flush(&self) {
        self.shared.flush().await;
    }

    /// Stop the timer, wait for an in-progress flush, then flush what is left.
    ///
    /// Entries logged after shutdown are mirrored to the console only.
    pub async fn shutdown(&self) {
        self.shared.stop.cancel();
        let task = self.shared.flush_task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
        self.shared.closed.store(true, Ordering::Release);
        self.shared.flush().await;
        self.drain_console().await;
    }

    /// Wait until every console line logged so far has been written.
    pub async fn drain_console(&self) {
        let Some(tx) = &self.shared.console else {
            return;
        };
        let (ack, done) = oneshot::channel();
        if tx.send(ConsoleMessage::Drained(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// File that receives entries stamped with `day`.
    pub fn log_file_path(&self, day: NaiveDate) -> PathBuf {
        log_file_path(&self.shared.config.log_dir, day)
    }

    pub fn pending(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Entries discarded because the queue was full or the logger was shut down.
    pub fn dropped_entries(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Flushes that failed and lost their batch.
    pub fn flush_failures(&self) -> u64 {
        self.shared.flush_failures.load(Ordering::Relaxed)
    }
}

impl Shared {
    async fn flush(&self) {
        if self.queue.lock().is_empty() {
            return;
        }

        let _writing = self.write_lock.lock().await;
        let batch: Vec<LogEntry> = self.queue.lock().drain(..).collect();
        if batch.is_empty() {
            return;
        }

        if write_batch(&self.config.log_dir, &batch).await.is_err() {
            self.flush_failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

async fn flush_loop(shared: Arc<Shared>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shared.stop.cancelled() => break,
            _ = ticker.tick() => shared.flush().await,
        }
    }
}

fn log_file_path(log_dir: &Path, day: NaiveDate) -> PathBuf {
    log_dir.join(format!("stream_{}.log", day.format("%Y-%m-%d")))
}

/// Append a batch with one write per calendar day it spans.
async fn write_batch(log_dir: &Path, batch: &[LogEntry]) -> std::io::Result<()> {
    fs::create_dir_all(log_dir).await?;

    for day_run in batch.chunk_by(|a, b| a.day() == b.day()) {
        let mut buf = String::new();
        for entry in day_run {
            buf.push_str(&entry.render());
            buf.push('\n');
        }

        let path = log_file_path(log_dir, day_run[0].day());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
    }

    Ok(())
}

/// Start the thread that owns stderr mirroring.
///
/// Returns `None` if the thread cannot be spawned; logging then continues
/// without a console mirror.
fn spawn_console_writer() -> Option<mpsc::Sender<ConsoleMessage>> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("datastream-console".to_string())
        .spawn(move || console_loop(rx))
        .ok()?;
    Some(tx)
}

/// Runs until every sender is gone.
fn console_loop(rx: mpsc::Receiver<ConsoleMessage>) {
    for message in rx {
        match message {
            ConsoleMessage::Line(severity, line) => mirror_to_console(severity, &line),
            ConsoleMessage::Drained(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn mirror_to_console(severity: Severity, line: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}{}\x1b[0m", severity.ansi_color(), line);
}
