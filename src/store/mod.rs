//! Durable record store.
//!
//! One CSV file per named resource under the output directory. Two write
//! paths share the same row encoding:
//!
//! - `write_all` stages the whole collection in `{file}.tmp`, keeps the old
//!   version as `{file}.bak` (best effort), and renames the side file over the
//!   target. Readers only ever see the old file or the new one.
//! - `append` opens the live file and adds one row, writing the header first
//!   when the file is new or empty.
//!
//! # Append Limitation
//!
//! `append` mutates the live file in place. A crash in the middle of an
//! append can leave a truncated last row. Full writes are not affected.
//!
//! Both paths hold the resource's lock from the `LockManager` for their whole
//! duration, so writes to one file never overlap.

mod csv;
mod record;
mod writer;


pub use csv::{CsvParseError, encode_row, escape_field, header_line, parse_csv, record_line};
pub use record::Record;
pub use writer::RecordStore;
