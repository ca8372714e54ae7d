//! Typed ingestion of dashboard snapshots.
//!
//! Upstream files are loosely typed: numbers arrive as strings, cells are
//! blank, flags are `"1"` or `"1.0"`. This module is the only place that
//! sees that shape. Everything past it works on [`Frame`] and
//! [`Observation`](crate::core::Observation).
//!
//! Cell-level problems never fail a load: an unparseable number becomes
//! `None`. A row whose date cannot be read is skipped and reported. Only
//! structural problems (missing columns, malformed documents) are errors.

pub mod csv;
pub mod json;

use crate::core::Frame;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

pub use self::csv::{parse_csv, CsvSchema};
pub use self::json::{parse_json, JsonSchema};

/// A row that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// 1-based record number (header excluded).
    pub line: usize,
    pub message: String,
}

/// What happened while reading a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows_read: usize,
    pub rows_used: usize,
    /// Non-empty cells that did not parse as numbers.
    pub coerced_cells: usize,
    /// Rows dropped because a later row carried the same timestamp.
    pub duplicate_rows: usize,
    pub issues: Vec<RowIssue>,
}

/// A parsed snapshot and its report.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub frame: Frame,
    pub report: IngestReport,
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse the date spellings found in snapshot files. Naive values are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
        }
    }

    None
}

/// Parse a numeric cell. Blank, `null` and `NaN` cells are missing, as is
/// anything that does not parse or is not finite.
pub fn parse_value(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if is_blank(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a boolean-as-string cell (`"1"`, `"1.0"`, `"true"`).
pub fn parse_flag(raw: &str) -> bool {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("true") {
        return true;
    }
    parse_value(s) == Some(1.0)
}

fn is_blank(s: &str) -> bool {
    s.is_empty()
        || s.eq_ignore_ascii_case("null")
        || s.eq_ignore_ascii_case("nan")
        || s.eq_ignore_ascii_case("none")
}

/// Non-blank cell that fails to parse.
pub(crate) fn is_coerced(raw: &str) -> bool {
    let s = raw.trim();
    !is_blank(s) && parse_value(s).is_none()
}

/// Sort rows by timestamp, keep the last row for repeated timestamps, and
/// build the frame.
fn assemble(
    mut rows: Vec<(DateTime<Utc>, Vec<Option<f64>>)>,
    labels: Vec<String>,
    report: &mut IngestReport,
) -> Result<Frame> {
    // Stable, so among equal timestamps file order is kept and the last wins.
    rows.sort_by_key(|(t, _)| *t);

    let mut deduped: Vec<(DateTime<Utc>, Vec<Option<f64>>)> = Vec::with_capacity(rows.len());
    for row in rows {
        match deduped.last_mut() {
            Some(last) if last.0 == row.0 => {
                *last = row;
                report.duplicate_rows += 1;
            }
            _ => deduped.push(row),
        }
    }

    if report.duplicate_rows > 0 {
        warn!(
            duplicates = report.duplicate_rows,
            "duplicate timestamps in snapshot; kept the last row for each"
        );
    }
    if report.coerced_cells > 0 {
        debug!(cells = report.coerced_cells, "unparseable cells read as missing");
    }
    if !report.issues.is_empty() {
        warn!(skipped = report.issues.len(), "rows without a readable date were skipped");
    }

    report.rows_used = deduped.len();

    let mut timestamps = Vec::with_capacity(deduped.len());
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(deduped.len()); labels.len()];
    for (t, values) in deduped {
        timestamps.push(t);
        for (column, v) in columns.iter_mut().zip(values) {
            column.push(v);
        }
    }

    Frame::new(timestamps, labels, columns)
}
