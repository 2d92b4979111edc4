//! Log entry and severity types.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a log entry, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "Debug")]
    Debug,
    #[default]
    #[serde(alias = "Information", alias = "info")]
    Information,
    #[serde(alias = "Warning", alias = "warn")]
    Warning,
    #[serde(alias = "Error")]
    Error,
}

impl Severity {
    /// Three-letter tag written into each log line.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Debug => "DBG",
            Severity::Information => "INF",
            Severity::Warning => "WRN",
            Severity::Error => "ERR",
        }
    }

    /// ANSI foreground color for console mirroring.
    pub(crate) fn ansi_color(self) -> &'static str {
        match self {
            Severity::Debug => "\x1b[90m",
            Severity::Information => "\x1b[36m",
            Severity::Warning => "\x1b[33m",
            Severity::Error => "\x1b[31m",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One immutable log line waiting to be flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    /// Free-text origin tag, e.g. `CsvWriter` or `Stream`.
    pub context: Option<String>,
    pub message: String,
}

impl LogEntry {
    pub fn new(severity: Severity, message: impl Into<String>, context: Option<&str>) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            context: context.map(str::to_string),
            message: message.into(),
        }
    }

    /// Calendar day whose log file receives this entry.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Render as `[timestamp][severity][context] message`.
    ///
    /// The context bracket is omitted when the entry has none.
    pub fn render(&self) -> String {
        let timestamp = self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        match &self.context {
            Some(context) => format!(
                "[{}][{}][{}] {}",
                timestamp, self.severity, context, self.message
            ),
            None => format!("[{}][{}] {}", timestamp, self.severity, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_entry(context: Option<&str>) -> LogEntry {
        LogEntry {
            timestamp: Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
            severity: Severity::Warning,
            context: context.map(str::to_string),
            message: "disk nearly full".to_string(),
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Information);
        assert!(Severity::Information < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_severity_parses_long_and_short_names() {
        let parsed: Severity = serde_yaml::from_str("Information").unwrap();
        assert_eq!(parsed, Severity::Information);
        let parsed: Severity = serde_yaml::from_str("warn").unwrap();
        assert_eq!(parsed, Severity::Warning);
        let parsed: Severity = serde_yaml::from_str("error").unwrap();
        assert_eq!(parsed, Severity::Error);
    }

    #[test]
    fn test_render_with_context() {
        let line = fixed_entry(Some("CsvWriter")).render();
        assert_eq!(
            line,
            "[2026-03-04 05:06:07.000][WRN][CsvWriter] disk nearly full"
        );
    }

    #[test]
    fn test_render_without_context() {
        let line = fixed_entry(None).render();
        assert_eq!(line, "[2026-03-04 05:06:07.000][WRN] disk nearly full");
    }

    #[test]
    fn test_day_matches_timestamp() {
        let entry = fixed_entry(None);
        assert_eq!(entry.day(), NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    }
}
