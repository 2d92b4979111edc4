//! Tests for the streaming orchestrator.

use super::*;
use crate::config::StreamConfig;
use crate::domain::{Customer, Invoice, Loan, RecordFactory, RecordKind, SyntheticFactory};
use crate::error::StreamError;
use crate::locks::LockManager;
use crate::logging::{Logger, LoggerConfig};
use crate::store::{RecordStore, parse_csv};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

type CycleHook = Box<dyn FnMut(u64) + Send>;

/// Synthetic records with a fixed batch size and a scripted kind sequence.
struct ScriptedFactory {
    inner: SyntheticFactory,
    batch: usize,
    kinds: VecDeque<RecordKind>,
    fallback_kind: RecordKind,
    cycles: u64,
    on_cycle: Option<CycleHook>,
}

impl ScriptedFactory {
    fn new(batch: usize, fallback_kind: RecordKind) -> Self {
        Self {
            inner: SyntheticFactory::new(Some(42)),
            batch,
            kinds: VecDeque::new(),
            fallback_kind,
            cycles: 0,
            on_cycle: None,
        }
    }

    fn with_hook(mut self, hook: impl FnMut(u64) + Send + 'static) -> Self {
        self.on_cycle = Some(Box::new(hook));
        self
    }
}

impl RecordFactory for ScriptedFactory {
    fn customer(&mut self, seq: u64) -> Customer {
        self.inner.customer(seq)
    }

    fn invoice(&mut self, seq: u64, roster: &[Customer]) -> Invoice {
        self.inner.invoice(seq, roster)
    }

    fn loan(&mut self, seq: u64, roster: &[Customer]) -> Loan {
        self.inner.loan(seq, roster)
    }

    fn batch_size(&mut self, _max_entries: usize) -> usize {
        self.cycles += 1;
        if let Some(hook) = self.on_cycle.as_mut() {
            hook(self.cycles);
        }
        self.batch
    }

    fn next_kind(&mut self) -> RecordKind {
        self.kinds.pop_front().unwrap_or(self.fallback_kind)
    }
}

struct Harness {
    dir: TempDir,
    config: StreamConfig,
    logger: Logger,
}

impl Harness {
    fn new(customers: usize, invoices: usize, loans: usize, max_cycles: Option<u64>) -> Self {
        let dir = TempDir::new().unwrap();
        let config = StreamConfig {
            output_dir: dir.path().join("out"),
            log_dir: dir.path().join("logs"),
            total_customers: customers,
            total_invoices: invoices,
            total_loans: loans,
            refresh_interval_ms: 100,
            max_cycles,
            lock_timeout_ms: 1_000,
            console_output: false,
            log_flush_interval_ms: 50,
            ..StreamConfig::default()
        };
        let logger = Logger::start(LoggerConfig::from_stream_config(&config));
        Self {
            dir,
            config,
            logger,
        }
    }

    fn engine(&self, factory: impl RecordFactory + 'static) -> StreamEngine {
        let locks = Arc::new(LockManager::new(self.config.lock_timeout()));
        let store = RecordStore::from_config(&self.config, locks, self.logger.clone());
        StreamEngine::new(
            store,
            self.logger.clone(),
            self.config.clone(),
            Box::new(factory),
        )
    }

    fn out(&self) -> PathBuf {
        self.config.output_dir.clone()
    }

    fn rows(&self, name: &str) -> Vec<Vec<String>> {
        let text = std::fs::read_to_string(self.out().join(name)).unwrap();
        parse_csv(&text).unwrap()
    }

    /// Everything the logger wrote, after a final flush.
    async fn log_text(&self) -> String {
        self.logger.shutdown().await;
        let mut text = String::new();
        for entry in std::fs::read_dir(self.dir.path().join("logs")).unwrap() {
            text.push_str(&std::fs::read_to_string(entry.unwrap().path()).unwrap());
        }
        text
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_bootstrap_then_one_invoice() {
    let h = Harness::new(3, 0, 0, Some(1));
    let mut engine = h.engine(ScriptedFactory::new(1, RecordKind::Invoice));
    let cancel = CancellationToken::new();

    let summary = engine.run(&cancel).await.unwrap();
    assert_eq!(
        summary,
        RunSummary {
            bootstrap_rows: 3,
            cycles: 1,
            committed: 1,
            failed_cycles: 0,
        }
    );
    assert_eq!(engine.phase(), EnginePhase::Stopped);
    assert_eq!(engine.ended_by(), None);

    let customers = h.rows("customers.csv");
    assert_eq!(customers.len(), 4);
    assert_eq!(customers[0][0], "Id");
    assert_eq!(customers[3][0], "C00003");

    let invoices = h.rows("invoices.csv");
    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[1][0], "INV-000001");
    assert!(engine.roster().iter().any(|c| c.id == invoices[1][1]));

    assert_eq!(h.rows("loans.csv").len(), 1);

    assert_eq!(
        file_names(&h.out()),
        ["customers.csv", "invoices.csv", "loans.csv"]
    );
}

#[tokio::test]
async fn test_streamed_keys_continue_after_bootstrap() {
    let h = Harness::new(2, 0, 0, Some(1));
    let mut engine = h.engine(ScriptedFactory::new(3, RecordKind::Customer));

    let summary = engine.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(summary.committed, 3);

    let ids: Vec<String> = h.rows("customers.csv")[1..]
        .iter()
        .map(|r| r[0].clone())
        .collect();
    assert_eq!(ids, ["C00001", "C00002", "C00003", "C00004", "C00005"]);
    assert_eq!(engine.roster().len(), 2);
}

#[tokio::test]
async fn test_mixed_batch_routes_each_kind() {
    let h = Harness::new(1, 1, 1, Some(1));
    let mut factory = ScriptedFactory::new(3, RecordKind::Loan);
    factory.kinds = VecDeque::from([RecordKind::Invoice, RecordKind::Customer]);
    let mut engine = h.engine(factory);

    engine.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(h.rows("customers.csv").len(), 3);
    assert_eq!(h.rows("invoices.csv").len(), 3);
    let loans = h.rows("loans.csv");
    assert_eq!(loans.len(), 3);
    assert_eq!(loans[2][0], "L-00002");
}

#[tokio::test]
async fn test_failed_cycle_does_not_stop_stream() {
    let h = Harness::new(2, 1, 0, Some(2));
    let out = h.out();
    let live = out.join("invoices.csv");
    let parked = out.join("invoices.parked");

    // Cycle 1: a directory sits where invoices.csv should be, so the append
    // fails. Cycle 2: the real file is back.
    let factory = ScriptedFactory::new(1, RecordKind::Invoice).with_hook(move |cycle| match cycle {
        1 => {
            std::fs::rename(&live, &parked).unwrap();
            std::fs::create_dir(&live).unwrap();
        }
        2 => {
            std::fs::remove_dir(&live).unwrap();
            std::fs::rename(&parked, &live).unwrap();
        }
        _ => {}
    });
    let mut engine = h.engine(factory);

    let summary = engine.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(summary.cycles, 2);
    assert_eq!(summary.failed_cycles, 1);
    assert_eq!(summary.committed, 1);

    let invoices = h.rows("invoices.csv");
    assert_eq!(invoices.len(), 3);
    assert_eq!(invoices[1][0], "INV-000001");
    assert_eq!(invoices[2][0], "INV-000002");

    let log = h.log_text().await;
    assert!(log.contains("[ERR][Stream] Cycle 1 failed on invoices.csv"));
    assert!(log.contains("Cycle 2: batch committed"));
}

#[tokio::test]
async fn test_cancel_before_bootstrap_writes_nothing() {
    let h = Harness::new(50, 50, 50, None);
    let mut engine = h.engine(SyntheticFactory::new(Some(1)));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = engine.run(&cancel).await.unwrap_err();
    assert!(matches!(err, StreamError::Cancelled));
    assert_eq!(err.exit_code(), crate::exit_codes::SUCCESS);
    assert_eq!(engine.phase(), EnginePhase::Stopped);
    assert_eq!(engine.ended_by(), Some(EnginePhase::Cancelled));

    let leftovers = if h.out().exists() {
        file_names(&h.out())
    } else {
        Vec::new()
    };
    assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
}

#[tokio::test]
async fn test_bootstrap_io_failure_is_fatal() {
    let h = Harness::new(5, 5, 5, Some(3));
    std::fs::write(h.out(), "not a directory").unwrap();
    let mut engine = h.engine(SyntheticFactory::new(Some(1)));

    let err = engine.run(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, StreamError::AtomicWrite { .. }));
    assert_ne!(err.exit_code(), crate::exit_codes::SUCCESS);
    assert_eq!(engine.phase(), EnginePhase::Stopped);
    assert_eq!(engine.ended_by(), Some(EnginePhase::Faulted));

    let log = h.log_text().await;
    assert!(log.contains("Bootstrap failed"));
    assert!(!log.contains("Phase 2"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_while_streaming_is_graceful() {
    let h = Harness::new(10, 10, 10, None);
    let mut engine = h.engine(ScriptedFactory::new(2, RecordKind::Loan));
    let mut phases = engine.subscribe();
    let cancel = CancellationToken::new();

    let run_cancel = cancel.clone();
    let task = tokio::spawn(async move {
        let result = engine.run(&run_cancel).await;
        (engine, result)
    });

    phases
        .wait_for(|p| *p == EnginePhase::Streaming)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    cancel.cancel();

    let (engine, result) = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
    let summary = result.unwrap();

    assert_eq!(engine.phase(), EnginePhase::Stopped);
    assert_eq!(engine.ended_by(), Some(EnginePhase::Cancelled));
    assert_eq!(summary.bootstrap_rows, 30);

    // A graceful stop is observable as Stopped, not only as Cancelled.
    phases
        .wait_for(|p| *p == EnginePhase::Stopped)
        .await
        .unwrap();
    assert_eq!(summary.failed_cycles, 0);

    let loans = h.rows("loans.csv");
    assert_eq!(loans.len() as u64, 1 + 10 + summary.committed);
    assert!(file_names(&h.out()).iter().all(|n| n.ends_with(".csv")));
}

#[tokio::test]
async fn test_zero_cycle_limit_stops_after_bootstrap() {
    let h = Harness::new(2, 2, 2, Some(0));
    let mut engine = h.engine(SyntheticFactory::new(Some(9)));
    let phases = engine.subscribe();

    let summary = engine.run(&CancellationToken::new()).await.unwrap();
    assert_eq!(summary.bootstrap_rows, 6);
    assert_eq!(summary.cycles, 0);
    assert_eq!(*phases.borrow(), EnginePhase::Stopped);
    assert_eq!(engine.ended_by(), None);
}
