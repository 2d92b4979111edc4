//! CSV row encoding and the matching reader.
//!
//! A field containing a comma, a double quote, CR, or LF is wrapped in double
//! quotes with inner quotes doubled. Every other field is written verbatim.
//! Each row ends with `\n`.

use super::record::Record;
use std::borrow::Cow;
use thiserror::Error;

/// Escape a single field.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Join escaped fields into one newline-terminated row.
pub fn encode_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_field(field.as_ref()));
    }
    line.push('\n');
    line
}

/// Header row for `T`.
pub fn header_line<T: Record>() -> String {
    encode_row(T::FIELDS)
}

/// Data row for one record.
pub fn record_line<T: Record>(record: &T) -> String {
    encode_row(record.values())
}

/// Malformed CSV input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CsvParseError {
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("unexpected character '{found}' after closing quote on line {line}")]
    TrailingCharacter { line: usize, found: char },
}

/// Split CSV text into rows of unescaped fields.
///
/// Accepts `\n` and `\r\n` row endings. A trailing newline does not produce
/// an empty final row.
pub fn parse_csv(text: &str) -> Result<Vec<Vec<String>>, CsvParseError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;
    let mut row_has_content = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if field.is_empty() => {
                let quote_line = line;
                row_has_content = true;
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(inner) => {
                            if inner == '\n' {
                                line += 1;
                            }
                            field.push(inner);
                        }
                        None => return Err(CsvParseError::UnterminatedQuote { line: quote_line }),
                    }
                }
                match chars.peek() {
                    None | Some(',') | Some('\n') | Some('\r') => {}
                    Some(&found) => return Err(CsvParseError::TrailingCharacter { line, found }),
                }
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                row_has_content = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                row_has_content = false;
                line += 1;
            }
            other => {
                field.push(other);
                row_has_content = true;
            }
        }
    }

    if row_has_content {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}
