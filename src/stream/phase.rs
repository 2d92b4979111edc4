//! Observable engine lifecycle.

use std::fmt;

/// Where a `StreamEngine` is in its run.
///
/// `Idle -> Bootstrap -> Streaming -> Stopped`. A run that ends early passes
/// through `Cancelled` or `Faulted` first; every run ends in `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnginePhase {
    Idle,
    Bootstrap,
    Streaming,
    /// The cancel signal fired.
    Cancelled,
    /// Bootstrap failed.
    Faulted,
    /// The run is over.
    Stopped,
}

impl EnginePhase {
    pub fn is_terminal(self) -> bool {
        self == EnginePhase::Stopped
    }
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnginePhase::Idle => "idle",
            EnginePhase::Bootstrap => "bootstrap",
            EnginePhase::Streaming => "streaming",
            EnginePhase::Cancelled => "cancelled",
            EnginePhase::Faulted => "faulted",
            EnginePhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
