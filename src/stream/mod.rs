//! Streaming orchestrator.
//!
//! A run has two phases:
//!
//! 1. **Bootstrap**: one full replace per resource (customers, then invoices,
//!    then loans). Any failure here ends the run.
//! 2. **Streaming**: on every tick of a fixed-period timer, a small batch of
//!    records is appended. A failed cycle is logged and the next tick still
//!    fires.
//!
//! Cancellation is observed before every tick and inside every store call.

mod engine;
mod phase;

pub use engine::{RunSummary, StreamEngine};
pub use phase::EnginePhase;

#[cfg(test)]
mod tests;
