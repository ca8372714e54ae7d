//! JSON snapshots: an array of flat records such as `{"date": .., "value": ..}`.

use super::{assemble, is_coerced, parse_timestamp, parse_value, Ingested, IngestReport, RowIssue};
use crate::error::{Result, SeriesError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Read;
use tracing::debug;

/// Which JSON fields to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonSchema {
    pub date_field: String,
    /// Metric fields to keep; empty keeps every field of the first record
    /// other than the date.
    pub value_fields: Vec<String>,
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self {
            date_field: "date".to_string(),
            value_fields: Vec::new(),
        }
    }
}

impl JsonSchema {
    pub fn new(date_field: impl Into<String>) -> Self {
        Self {
            date_field: date_field.into(),
            value_fields: Vec::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Numbers and numeric strings are values; anything else is missing.
fn json_value(v: Option<&Value>) -> (Option<f64>, bool) {
    match v {
        Some(Value::Number(n)) => (n.as_f64().filter(|x| x.is_finite()), false),
        Some(Value::String(s)) => (parse_value(s), is_coerced(s)),
        Some(Value::Null) | None => (None, false),
        Some(_) => (None, true),
    }
}

fn record_date(record: &Map<String, Value>, field: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    match record.get(field)? {
        Value::String(s) => parse_timestamp(s),
        _ => None,
    }
}

/// Read a JSON snapshot into a frame.
pub fn parse_json<R: Read>(reader: R, schema: &JsonSchema) -> Result<Ingested> {
    let document: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = document else {
        return Err(SeriesError::UnsupportedFormat(
            "json snapshot must be an array of records".to_string(),
        ));
    };

    let fields: Vec<String> = if schema.value_fields.is_empty() {
        items
            .iter()
            .find_map(Value::as_object)
            .map(|first| {
                first
                    .keys()
                    .filter(|k| **k != schema.date_field)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    } else {
        schema.value_fields.clone()
    };

    let mut report = IngestReport::default();
    let mut rows = Vec::with_capacity(items.len());

    for (n, item) in items.iter().enumerate() {
        let line = n + 1;
        report.rows_read += 1;

        let Some(record) = item.as_object() else {
            report.issues.push(RowIssue {
                line,
                message: "record is not an object".to_string(),
            });
            continue;
        };

        let Some(timestamp) = record_date(record, &schema.date_field) else {
            report.issues.push(RowIssue {
                line,
                message: format!("unreadable '{}' field", schema.date_field),
            });
            continue;
        };

        let values: Vec<Option<f64>> = fields
            .iter()
            .map(|f| {
                let (value, coerced) = json_value(record.get(f));
                if coerced {
                    report.coerced_cells += 1;
                }
                value
            })
            .collect();
        rows.push((timestamp, values));
    }

    let frame = assemble(rows, fields, &mut report)?;
    debug!(
        rows = report.rows_read,
        used = report.rows_used,
        metrics = frame.width(),
        "parsed json snapshot"
    );

    Ok(Ingested { frame, report })
}
