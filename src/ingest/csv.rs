//! CSV snapshots: a header row, one date column, numeric metric columns.

use super::{assemble, is_coerced, parse_timestamp, parse_value, Ingested, IngestReport, RowIssue};
use crate::error::{Result, SeriesError};
use ::csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{debug, warn};

/// Which CSV columns to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSchema {
    /// Header of the timestamp column. Matched exactly first, then
    /// ignoring ASCII case.
    pub date_column: String,
    /// Metric columns to keep; empty keeps every other column.
    pub value_columns: Vec<String>,
}

impl Default for CsvSchema {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            value_columns: Vec::new(),
        }
    }
}

impl CsvSchema {
    pub fn new(date_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            value_columns: Vec::new(),
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Index of a header; a repeated header resolves to its last occurrence.
fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    let last = |matches: &dyn Fn(&str) -> bool| {
        headers
            .iter()
            .enumerate()
            .filter(|&(_, h)| matches(h))
            .map(|(i, _)| i)
            .last()
    };
    last(&|h| h == name).or_else(|| last(&|h| h.eq_ignore_ascii_case(name)))
}

/// Collapse repeated labels onto one metric, reading the last column.
fn dedupe_labels(selected: Vec<(String, usize)>) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = Vec::with_capacity(selected.len());
    for (name, idx) in selected {
        match out.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => {
                warn!(column = %name, "repeated column header; reading the last one");
                slot.1 = idx;
            }
            None => out.push((name, idx)),
        }
    }
    out
}

/// Read a CSV snapshot into a frame.
pub fn parse_csv<R: Read>(reader: R, schema: &CsvSchema) -> Result<Ingested> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = find_column(&headers, &schema.date_column)
        .ok_or_else(|| SeriesError::MissingColumn(schema.date_column.clone()))?;

    let selected: Vec<(String, usize)> = if schema.value_columns.is_empty() {
        headers
            .iter()
            .enumerate()
            .filter(|&(i, h)| i != date_idx && !h.is_empty())
            .map(|(i, h)| (h.to_string(), i))
            .collect()
    } else {
        schema
            .value_columns
            .iter()
            .map(|name| {
                find_column(&headers, name)
                    .map(|i| (name.clone(), i))
                    .ok_or_else(|| SeriesError::MissingColumn(name.clone()))
            })
            .collect::<Result<_>>()?
    };
    let selected = dedupe_labels(selected);

    let mut report = IngestReport::default();
    let mut rows = Vec::with_capacity(64);

    for (n, record) in rdr.records().enumerate() {
        let line = n + 1;
        report.rows_read += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                report.issues.push(RowIssue {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let raw_date = record.get(date_idx).unwrap_or("");
        let Some(timestamp) = parse_timestamp(raw_date) else {
            report.issues.push(RowIssue {
                line,
                message: format!("unreadable date '{raw_date}'"),
            });
            continue;
        };

        let values: Vec<Option<f64>> = selected
            .iter()
            .map(|&(_, i)| {
                let cell = record.get(i).unwrap_or("");
                if is_coerced(cell) {
                    report.coerced_cells += 1;
                }
                parse_value(cell)
            })
            .collect();
        rows.push((timestamp, values));
    }

    let labels = selected.into_iter().map(|(name, _)| name).collect();
    let frame = assemble(rows, labels, &mut report)?;
    debug!(
        rows = report.rows_read,
        used = report.rows_used,
        metrics = frame.width(),
        "parsed csv snapshot"
    );

    Ok(Ingested { frame, report })
}
