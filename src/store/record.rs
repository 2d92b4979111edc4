//! The row contract every persisted type implements.

/// A flat value object the store can write as one CSV row.
///
/// `FIELDS` is the header, declared once per type; `values` must return the
/// same number of entries in the same order. Absent optional values render
/// as the empty string.
pub trait Record {
    const FIELDS: &'static [&'static str];

    fn values(&self) -> Vec<String>;
}
