//! Datastream CLI entry point.
//!
//! Parses arguments, runs the selected command on a multi-threaded tokio
//! runtime, and maps errors to exit codes.

mod cli;
mod commands;

use cli::Cli;
use datastream::error::StreamError;
use datastream::exit_codes;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start async runtime: {}", err);
            return ExitCode::from(exit_codes::RUNTIME_FAILURE as u8);
        }
    };

    match runtime.block_on(commands::dispatch(cli.command)) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(StreamError::Cancelled) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
