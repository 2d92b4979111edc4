//! Command implementations for datastream.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod init;
mod inspect;
mod run;

use crate::cli::Command;
use datastream::error::Result;

/// Dispatch a command to its implementation.
pub async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run::cmd_run(args).await,
        Command::Init(args) => init::cmd_init(args).await,
        Command::Inspect(args) => inspect::cmd_inspect(args).await,
    }
}
