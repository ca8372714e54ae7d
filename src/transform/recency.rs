//! Recency filters: cutoff-based truncation for display.

use crate::core::Observation;
use crate::error::SeriesError;
use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback period offered by the chart controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecencyFilter {
    LastMonth,
    LastQuarter,
    YearToDate,
    #[default]
    LastYear,
    TwoYears,
    AllTime,
}

impl RecencyFilter {
    pub const ALL: [RecencyFilter; 6] = [
        RecencyFilter::LastMonth,
        RecencyFilter::LastQuarter,
        RecencyFilter::YearToDate,
        RecencyFilter::LastYear,
        RecencyFilter::TwoYears,
        RecencyFilter::AllTime,
    ];

    /// Short label used on the lookback buttons.
    pub fn label(&self) -> &'static str {
        match self {
            RecencyFilter::LastMonth => "M",
            RecencyFilter::LastQuarter => "Q",
            RecencyFilter::YearToDate => "YTD",
            RecencyFilter::LastYear => "Y",
            RecencyFilter::TwoYears => "2Y",
            RecencyFilter::AllTime => "AT",
        }
    }

    /// Earliest timestamp kept relative to `now`; `None` keeps everything.
    ///
    /// Month arithmetic clamps to the end of the target month
    /// (March 31 minus one month is February 28/29).
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months_back = match self {
            RecencyFilter::AllTime => return None,
            RecencyFilter::YearToDate => {
                return Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0).single();
            }
            RecencyFilter::LastMonth => 1,
            RecencyFilter::LastQuarter => 3,
            RecencyFilter::LastYear => 12,
            RecencyFilter::TwoYears => 24,
        };
        // Underflow only happens near the minimum representable date; keep
        // everything in that case.
        now.checked_sub_months(Months::new(months_back))
    }

    /// Index of the first observation at or after the cutoff.
    ///
    /// Observations must be in ascending timestamp order.
    pub fn start_index(&self, observations: &[Observation], now: DateTime<Utc>) -> usize {
        match self.cutoff(now) {
            Some(cutoff) => observations.partition_point(|o| o.timestamp < cutoff),
            None => 0,
        }
    }

    /// The retained tail of `observations`.
    pub fn apply<'a>(&self, observations: &'a [Observation], now: DateTime<Utc>) -> &'a [Observation] {
        &observations[self.start_index(observations, now)..]
    }
}

impl fmt::Display for RecencyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecencyFilter {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "1m" | "month" | "last-month" => Ok(RecencyFilter::LastMonth),
            "q" | "3m" | "quarter" | "last-quarter" => Ok(RecencyFilter::LastQuarter),
            "ytd" | "year-to-date" => Ok(RecencyFilter::YearToDate),
            "y" | "1y" | "year" | "last-year" => Ok(RecencyFilter::LastYear),
            "2y" | "two-years" => Ok(RecencyFilter::TwoYears),
            "at" | "all" | "all-time" => Ok(RecencyFilter::AllTime),
            other => Err(SeriesError::InvalidParameter(format!(
                "unknown recency filter '{other}'"
            ))),
        }
    }
}
