//! Implementation of the `datastream init` command.

use crate::cli::InitArgs;
use datastream::config::StreamConfig;
use datastream::error::{Result, StreamError};

/// Execute the `datastream init` command.
///
/// Writes the default configuration atomically. An existing file is only
/// replaced with `--force`.
pub async fn cmd_init(args: InitArgs) -> Result<()> {
    if args.config.exists() && !args.force {
        return Err(StreamError::Config(format!(
            "'{}' already exists (use --force to overwrite)",
            args.config.display()
        )));
    }

    if let Some(parent) = args.config.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StreamError::Io(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    StreamConfig::default().save(&args.config).await?;

    println!("Wrote default configuration to {}", args.config.display());
    println!();
    println!("Next: datastream run --config {}", args.config.display());
    Ok(())
}
