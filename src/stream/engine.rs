//! The bootstrap-then-stream run loop.

use super::phase::EnginePhase;
use crate::config::StreamConfig;
use crate::domain::{Customer, Invoice, Loan, RecordFactory, RecordKind};
use crate::error::{Result, StreamError};
use crate::logging::Logger;
use crate::store::RecordStore;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

const ENGINE_CONTEXT: &str = "Engine";
const STREAM_CONTEXT: &str = "Stream";
const BANNER_RULE: &str = "=======================================================";

/// Totals for one run, reported when the engine stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Data rows written across the three bootstrap files.
    pub bootstrap_rows: usize,
    /// Streaming ticks that started a cycle.
    pub cycles: u64,
    /// Records appended during streaming.
    pub committed: u64,
    /// Cycles that stopped on a store error.
    pub failed_cycles: u64,
}

/// A streaming cycle that stopped partway.
#[derive(Debug)]
struct CycleFailure {
    resource: &'static str,
    committed: usize,
    error: StreamError,
}

/// Last business-key sequence number issued per record kind.
#[derive(Debug, Default, Clone, Copy)]
struct Sequences {
    customer: u64,
    invoice: u64,
    loan: u64,
}

/// Drives bootstrap and streaming against a `RecordStore`.
pub struct StreamEngine {
    store: RecordStore,
    logger: Logger,
    config: StreamConfig,
    factory: Box<dyn RecordFactory>,
    phase: watch::Sender<EnginePhase>,
    roster: Vec<Customer>,
    issued: Sequences,
    ended_by: Option<EnginePhase>,
}

impl StreamEngine {
    pub fn new(
        store: RecordStore,
        logger: Logger,
        config: StreamConfig,
        factory: Box<dyn RecordFactory>,
    ) -> Self {
        let (phase, _) = watch::channel(EnginePhase::Idle);
        Self {
            store,
            logger,
            config,
            factory,
            phase,
            roster: Vec::new(),
            issued: Sequences::default(),
            ended_by: None,
        }
    }

    /// Watch phase transitions. Receivers see the latest phase.
    pub fn subscribe(&self) -> watch::Receiver<EnginePhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> EnginePhase {
        *self.phase.borrow()
    }

    /// `Cancelled` or `Faulted` when the last run ended early; `None` when it
    /// reached its cycle limit or has not finished.
    pub fn ended_by(&self) -> Option<EnginePhase> {
        self.ended_by
    }

    /// Customers that streamed invoices and loans may reference.
    pub fn roster(&self) -> &[Customer] {
        &self.roster
    }

    /// Run bootstrap, then stream until `cancel` fires or `max_cycles` is reached.
    ///
    /// # Returns
    ///
    /// * `Ok(summary)` - Streaming ended by cancellation or cycle limit
    /// * `Err(StreamError::Cancelled)` - Cancelled during bootstrap
    /// * `Err(_)` - Any other bootstrap failure
    ///
    /// Streaming-cycle failures never end the run; they are logged and
    /// counted in `RunSummary::failed_cycles`.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<RunSummary> {
        self.log_banner();

        let mut summary = RunSummary::default();

        self.set_phase(EnginePhase::Bootstrap);
        match self.bootstrap(cancel).await {
            Ok(rows) => summary.bootstrap_rows = rows,
            Err(e) => {
                if matches!(e, StreamError::Cancelled) {
                    self.logger
                        .warning("Bootstrap cancelled; run aborted", Some(ENGINE_CONTEXT));
                    self.finish(Some(EnginePhase::Cancelled));
                } else {
                    self.logger
                        .error_with("Bootstrap failed; run aborted", &e, Some(ENGINE_CONTEXT));
                    self.finish(Some(EnginePhase::Faulted));
                }
                return Err(e);
            }
        }

        self.set_phase(EnginePhase::Streaming);
        let cancelled = self.stream(cancel, &mut summary).await;

        self.logger.info(
            format!(
                "Streaming stopped after {} cycles: {} entries committed, {} cycles failed",
                summary.cycles, summary.committed, summary.failed_cycles
            ),
            Some(ENGINE_CONTEXT),
        );
        self.finish(cancelled.then_some(EnginePhase::Cancelled));

        Ok(summary)
    }

    fn set_phase(&self, phase: EnginePhase) {
        self.phase.send_replace(phase);
    }

    /// Publish the cause of an early end, if any, then `Stopped`.
    fn finish(&mut self, cause: Option<EnginePhase>) {
        self.ended_by = cause;
        if let Some(cause) = cause {
            self.set_phase(cause);
        }
        self.set_phase(EnginePhase::Stopped);
    }

    fn log_banner(&self) {
        let log = |message: String| self.logger.info(message, Some(ENGINE_CONTEXT));
        let config = &self.config;

        log(BANNER_RULE.to_string());
        log(format!(
            "  datastream v{} - streaming record engine",
            env!("CARGO_PKG_VERSION")
        ));
        log(BANNER_RULE.to_string());
        log(format!("Started by {}", actor_string()));
        log(format!(
            "Config: customers {} | invoices {} | loans {}",
            config.total_customers, config.total_invoices, config.total_loans
        ));
        log(format!(
            "Config: refresh {}ms | output {}",
            config.refresh_interval_ms,
            config.output_dir.display()
        ));
        log("Press Ctrl+C to stop gracefully.".to_string());
    }

    /// Write the three full datasets in order.
    async fn bootstrap(&mut self, cancel: &CancellationToken) -> Result<usize> {
        self.logger
            .info("Phase 1: generating full dataset", Some(ENGINE_CONTEXT));

        let customers: Vec<Customer> = (1..=self.config.total_customers as u64)
            .map(|seq| self.factory.customer(seq))
            .collect();
        let mut rows = self
            .store
            .write_all(RecordKind::Customer.resource(), &customers, cancel)
            .await?;

        let invoices: Vec<Invoice> = (1..=self.config.total_invoices as u64)
            .map(|seq| self.factory.invoice(seq, &customers))
            .collect();
        rows += self
            .store
            .write_all(RecordKind::Invoice.resource(), &invoices, cancel)
            .await?;

        let loans: Vec<Loan> = (1..=self.config.total_loans as u64)
            .map(|seq| self.factory.loan(seq, &customers))
            .collect();
        rows += self
            .store
            .write_all(RecordKind::Loan.resource(), &loans, cancel)
            .await?;

        self.issued = Sequences {
            customer: customers.len() as u64,
            invoice: invoices.len() as u64,
            loan: loans.len() as u64,
        };
        self.roster = customers;

        self.logger.info(
            format!("Phase 1 complete: {} total records written", rows),
            Some(ENGINE_CONTEXT),
        );
        Ok(rows)
    }

    /// Tick loop. Returns true when it ended because `cancel` fired.
    async fn stream(&mut self, cancel: &CancellationToken, summary: &mut RunSummary) -> bool {
        self.logger
            .info("Phase 2: starting incremental streaming", Some(ENGINE_CONTEXT));

        let period = self.config.refresh_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if let Some(max) = self.config.max_cycles
                && summary.cycles >= max
            {
                return false;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return true,
                _ = ticker.tick() => {}
            }

            summary.cycles += 1;
            let cycle = summary.cycles;

            match self.run_cycle(cycle, cancel).await {
                Ok(committed) => summary.committed += committed as u64,
                Err(failure) => {
                    summary.committed += failure.committed as u64;
                    if matches!(failure.error, StreamError::Cancelled) {
                        self.logger.warning(
                            format!(
                                "Cycle {}: cancelled after {} entries",
                                cycle, failure.committed
                            ),
                            Some(STREAM_CONTEXT),
                        );
                    } else {
                        summary.failed_cycles += 1;
                        self.logger.error_with(
                            format!("Cycle {} failed on {}", cycle, failure.resource),
                            &failure.error,
                            Some(STREAM_CONTEXT),
                        );
                    }
                }
            }
        }
    }

    async fn run_cycle(
        &mut self,
        cycle: u64,
        cancel: &CancellationToken,
    ) -> std::result::Result<usize, CycleFailure> {
        let batch = self
            .factory
            .batch_size(self.config.max_entries_per_cycle)
            .max(1);
        self.logger.info(
            format!("Cycle {}: streaming {} new entries", cycle, batch),
            Some(STREAM_CONTEXT),
        );

        for committed in 0..batch {
            let kind = self.factory.next_kind();
            self.append_one(kind, cancel)
                .await
                .map_err(|error| CycleFailure {
                    resource: kind.resource(),
                    committed,
                    error,
                })?;
        }

        self.logger.info(
            format!("Cycle {}: batch committed", cycle),
            Some(STREAM_CONTEXT),
        );
        Ok(batch)
    }

    /// Append one new record of `kind`. The key sequence only advances when
    /// the append succeeds.
    async fn append_one(&mut self, kind: RecordKind, cancel: &CancellationToken) -> Result<()> {
        let resource = kind.resource();
        match kind {
            RecordKind::Customer => {
                let seq = self.issued.customer + 1;
                let customer = self.factory.customer(seq);
                self.store.append(resource, &customer, cancel).await?;
                self.issued.customer = seq;
            }
            RecordKind::Invoice => {
                let seq = self.issued.invoice + 1;
                let invoice = self.factory.invoice(seq, &self.roster);
                self.store.append(resource, &invoice, cancel).await?;
                self.issued.invoice = seq;
            }
            RecordKind::Loan => {
                let seq = self.issued.loan + 1;
                let loan = self.factory.loan(seq, &self.roster);
                self.store.append(resource, &loan, cancel).await?;
                self.issued.loan = seq;
            }
        }
        Ok(())
    }
}

/// `user@host` of the process owner.
pub(crate) fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
