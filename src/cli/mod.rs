//! CLI argument parsing for datastream.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Datastream: bootstrap CSV datasets, then stream incremental records into them.
///
/// Each resource (customers.csv, invoices.csv, loans.csv) has its own lock;
/// full writes are published atomically and a `.bak` keeps the previous version.
#[derive(Parser, Debug)]
#[command(name = "datastream")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for datastream.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the engine until Ctrl+C, SIGTERM, or the cycle limit.
    ///
    /// Writes the full dataset once, then appends a small batch on every tick.
    Run(RunArgs),

    /// Write a default configuration file.
    Init(InitArgs),

    /// Check a produced CSV file and report its header and row count.
    Inspect(InspectArgs),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Config file (defaults to datastream.yaml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the output directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Override the log directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Stop after this many streaming cycles.
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Seed the record generator for a reproducible dataset.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not mirror log entries to the console.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `init` command.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the config file.
    #[arg(short, long, default_value = datastream::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `inspect` command.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// CSV file to check.
    pub file: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
