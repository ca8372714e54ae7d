//! Typed rows of a backtest result file.
//!
//! The file carries one row per date with `portfolio_value`,
//! `benchmark_cum_return`, and for every asset `{asset}_cum_return` and a
//! `{asset}_position` flag.

use crate::core::{Observation, Series};
use crate::error::{Result, SeriesError};
use crate::ingest::{is_coerced, parse_flag, parse_timestamp, parse_value, IngestReport, RowIssue};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::warn;

const DATE_COLUMN: &str = "date";
const PORTFOLIO_COLUMN: &str = "portfolio_value";
const BENCHMARK_COLUMN: &str = "benchmark_cum_return";
const RETURN_SUFFIX: &str = "_cum_return";
const POSITION_SUFFIX: &str = "_position";

/// Rebase a cumulative return to an index starting at 100.
#[inline]
pub fn rebase(cum_return: f64) -> f64 {
    (1.0 + cum_return) * 100.0
}

/// One asset on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssetLeg {
    /// Cumulative return rebased to 100.
    pub index: Option<f64>,
    pub in_position: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestRecord {
    pub date: DateTime<Utc>,
    pub portfolio_value: Option<f64>,
    /// Benchmark cumulative return rebased to 100.
    pub benchmark_index: Option<f64>,
    pub assets: BTreeMap<String, AssetLeg>,
}

/// A date on which the strategy held an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub date: DateTime<Utc>,
    pub asset: String,
}

struct Columns {
    date: usize,
    portfolio: Option<usize>,
    benchmark: Option<usize>,
    /// (asset, return column, position column)
    assets: Vec<(String, Option<usize>, Option<usize>)>,
}

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Assets named by `{asset}_cum_return` headers, benchmark excluded.
pub fn discover_assets(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .filter(|h| *h != BENCHMARK_COLUMN)
        .filter_map(|h| h.strip_suffix(RETURN_SUFFIX))
        .map(str::to_string)
        .collect()
}

fn resolve_columns(headers: &StringRecord, assets: &[String]) -> Result<Columns> {
    let date = column(headers, DATE_COLUMN)
        .ok_or_else(|| SeriesError::MissingColumn(DATE_COLUMN.to_string()))?;

    let assets = if assets.is_empty() {
        discover_assets(headers)
    } else {
        assets.to_vec()
    };

    let assets = assets
        .into_iter()
        .map(|asset| {
            let ret = column(headers, &format!("{asset}{RETURN_SUFFIX}"));
            let pos = column(headers, &format!("{asset}{POSITION_SUFFIX}"));
            if ret.is_none() && pos.is_none() {
                return Err(SeriesError::MissingColumn(format!("{asset}{RETURN_SUFFIX}")));
            }
            Ok((asset, ret, pos))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Columns {
        date,
        portfolio: column(headers, PORTFOLIO_COLUMN),
        benchmark: column(headers, BENCHMARK_COLUMN),
        assets,
    })
}

/// Read a backtest CSV. `assets` selects legs; empty reads every asset the
/// header names. Rows that cannot be read are skipped.
pub fn parse_backtest<R: Read>(reader: R, assets: &[String]) -> Result<Vec<BacktestRecord>> {
    parse_backtest_with_report(reader, assets).map(|(records, _)| records)
}

/// As [`parse_backtest`], also reporting skipped rows and coerced cells.
pub fn parse_backtest_with_report<R: Read>(
    reader: R,
    assets: &[String],
) -> Result<(Vec<BacktestRecord>, IngestReport)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let cols = resolve_columns(&headers, assets)?;

    let mut report = IngestReport::default();
    let mut records = Vec::new();

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

        let raw_date = record.get(cols.date).unwrap_or("");
        let Some(date) = parse_timestamp(raw_date) else {
            report.issues.push(RowIssue {
                line,
                message: format!("unreadable date '{raw_date}'"),
            });
            continue;
        };

        let mut cell = |idx: Option<usize>| -> Option<f64> {
            let raw = idx.and_then(|i| record.get(i))?;
            if is_coerced(raw) {
                report.coerced_cells += 1;
            }
            parse_value(raw)
        };

        let portfolio_value = cell(cols.portfolio);
        let benchmark_index = cell(cols.benchmark).map(rebase);
        let legs = cols
            .assets
            .iter()
            .map(|(asset, ret, pos)| {
                let leg = AssetLeg {
                    index: cell(*ret).map(rebase),
                    in_position: pos
                        .and_then(|i| record.get(i))
                        .is_some_and(parse_flag),
                };
                (asset.clone(), leg)
            })
            .collect();

        records.push(BacktestRecord {
            date,
            portfolio_value,
            benchmark_index,
            assets: legs,
        });
    }

    if !report.issues.is_empty() {
        warn!(
            skipped = report.issues.len(),
            "unreadable backtest rows were skipped"
        );
    }

    records.sort_by_key(|r| r.date);
    report.rows_used = records.len();
    Ok((records, report))
}

/// Every (date, asset) where the asset was held, in date order.
pub fn positions(records: &[BacktestRecord]) -> Vec<Position> {
    records
        .iter()
        .flat_map(|r| {
            r.assets
                .iter()
                .filter(|(_, leg)| leg.in_position)
                .map(|(asset, _)| Position {
                    date: r.date,
                    asset: asset.clone(),
                })
        })
        .collect()
}

/// Number of held dates per asset; assets never held count zero.
pub fn position_counts(records: &[BacktestRecord]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        for (asset, leg) in &record.assets {
            *counts.entry(asset.clone()).or_default() += usize::from(leg.in_position);
        }
    }
    counts
}

fn to_series(
    name: &str,
    records: &[BacktestRecord],
    value: impl Fn(&BacktestRecord) -> Option<f64>,
) -> Result<Series> {
    let mut observations: Vec<Observation> = Vec::with_capacity(records.len());
    for r in records {
        let obs = Observation::new(r.date, value(r));
        match observations.last_mut() {
            Some(last) if last.timestamp == obs.timestamp => *last = obs,
            _ => observations.push(obs),
        }
    }
    Series::new(name, observations)
}

/// Portfolio value as a series, ready for the chart transform.
pub fn portfolio_series(records: &[BacktestRecord]) -> Result<Series> {
    to_series(PORTFOLIO_COLUMN, records, |r| r.portfolio_value)
}

/// Rebased benchmark as a series.
pub fn benchmark_series(records: &[BacktestRecord]) -> Result<Series> {
    to_series("benchmark", records, |r| r.benchmark_index)
}

/// Rebased cumulative return of one asset.
pub fn asset_series(records: &[BacktestRecord], asset: &str) -> Result<Series> {
    if records.first().is_some_and(|r| !r.assets.contains_key(asset)) {
        return Err(SeriesError::UnknownMetric(asset.to_string()));
    }
    to_series(asset, records, |r| r.assets.get(asset).and_then(|leg| leg.index))
}
