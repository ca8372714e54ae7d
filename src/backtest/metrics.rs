//! Summary metrics panel for a backtest run.

use crate::error::{Result, SeriesError};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

/// Metrics shown as percentages.
const PERCENT_METRICS: [&str; 5] = [
    "Total Return",
    "Annualized Return",
    "Max Drawdown",
    "Benchmark Return",
    "Average Position Change",
];

const DATE_METRICS: [&str; 2] = ["Start Date", "End Date"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Numbers where the cell parses as one, text otherwise.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => MetricValue::Number(v),
            _ => MetricValue::Text(s.to_string()),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(v) => write!(f, "{v}"),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub name: String,
    pub value: MetricValue,
}

/// Render a metric value for the panel.
pub fn format_metric(name: &str, value: &MetricValue) -> String {
    if DATE_METRICS.contains(&name) {
        let text = value.to_string();
        return text.split(' ').next().unwrap_or_default().to_string();
    }

    match value {
        MetricValue::Number(v) if PERCENT_METRICS.contains(&name) => {
            format!("{:.2}%", v * 100.0)
        }
        MetricValue::Number(v) if v.fract() == 0.0 => format!("{v}"),
        MetricValue::Number(v) => format!("{v:.3}"),
        MetricValue::Text(s) => s.clone(),
    }
}

/// Read a two-column `Metric,Value` CSV.
pub fn parse_metrics<R: Read>(reader: R) -> Result<Vec<MetricRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| SeriesError::MissingColumn(name.to_string()))
    };
    let name_idx = find("Metric")?;
    let value_idx = find("Value")?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let Some(name) = record.get(name_idx).filter(|n| !n.is_empty()) else {
            continue;
        };
        rows.push(MetricRow {
            name: name.to_string(),
            value: MetricValue::parse(record.get(value_idx).unwrap_or("")),
        });
    }
    Ok(rows)
}

/// One line of the metrics panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PanelItem {
    Metric { name: String, text: String },
    Label { left: String, right: String },
    Divider,
}

/// Lay out the panel: the first row (the strategy title) is dropped, a
/// divider follows "Average Position Change", and a benchmark label
/// precedes "Benchmark Return".
pub fn panel(rows: &[MetricRow], benchmark_asset: &str) -> Vec<PanelItem> {
    let mut items = Vec::with_capacity(rows.len() + 2);
    for row in rows.iter().skip(1) {
        if row.name == "Benchmark Return" {
            items.push(PanelItem::Label {
                left: "Benchmark Asset:".to_string(),
                right: benchmark_asset.to_string(),
            });
        }
        items.push(PanelItem::Metric {
            name: row.name.clone(),
            text: format_metric(&row.name, &row.value),
        });
        if row.name == "Average Position Change" {
            items.push(PanelItem::Divider);
        }
    }
    items
}
