//! Implementation of the `datastream inspect` command.

use crate::cli::InspectArgs;
use datastream::error::{Result, StreamError};
use datastream::store::parse_csv;
use serde_json::json;
use std::path::Path;

/// What a well-formed CSV file contains.
#[derive(Debug, PartialEq, Eq)]
struct Report {
    header: Vec<String>,
    rows: usize,
}

/// Execute the `datastream inspect` command.
///
/// Fails when the file cannot be parsed, has no header, or has a row whose
/// field count differs from the header's.
pub async fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let report = inspect_file(&args.file).await?;

    if args.json {
        let value = json!({
            "file": args.file.display().to_string(),
            "header": report.header,
            "rows": report.rows,
        });
        println!("{}", value);
    } else {
        println!("File:    {}", args.file.display());
        println!("Columns: {}", report.header.join(", "));
        println!("Rows:    {}", report.rows);
    }
    Ok(())
}

async fn inspect_file(path: &Path) -> Result<Report> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StreamError::Io(format!("failed to read '{}': {}", path.display(), e)))?;

    let mut rows = parse_csv(&text)
        .map_err(|e| StreamError::Io(format!("'{}' is not valid CSV: {}", path.display(), e)))?
        .into_iter();

    let Some(header) = rows.next() else {
        return Err(StreamError::Io(format!(
            "'{}' has no header row",
            path.display()
        )));
    };

    let mut count = 0;
    for (index, row) in rows.enumerate() {
        if row.len() != header.len() {
            return Err(StreamError::Io(format!(
                "'{}' data row {} has {} fields, expected {}",
                path.display(),
                index + 1,
                row.len(),
                header.len()
            )));
        }
        count += 1;
    }

    Ok(Report {
        header,
        rows: count,
    })
}
