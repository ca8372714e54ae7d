//! The display transform: full-history statistics sliced to a lookback.

use crate::core::Observation;
use crate::transform::recency::RecencyFilter;
use crate::transform::window::{rolling_mean, rolling_z_score, EvictionPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Display parameters for one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    /// Trailing z-score window; values below 2 disable the z-score.
    pub z_score_window: Option<usize>,
    /// Moving-average period; zero disables the moving average.
    pub moving_average_period: Option<usize>,
    pub recency: RecencyFilter,
    pub eviction: EvictionPolicy,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            z_score_window: None,
            moving_average_period: None,
            recency: RecencyFilter::default(),
            eviction: EvictionPolicy::default(),
        }
    }
}

impl TransformParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_z_score(mut self, window: usize) -> Self {
        self.z_score_window = Some(window);
        self
    }

    pub fn with_moving_average(mut self, period: usize) -> Self {
        self.moving_average_period = Some(period);
        self
    }

    pub fn with_recency(mut self, recency: RecencyFilter) -> Self {
        self.recency = recency;
        self
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    /// The z-score window if it is usable.
    pub fn effective_z_score_window(&self) -> Option<usize> {
        self.z_score_window.filter(|&w| w >= 2)
    }

    /// The moving-average period if it is usable.
    pub fn effective_moving_average_period(&self) -> Option<usize> {
        self.moving_average_period.filter(|&p| p >= 1)
    }
}

/// Filtered observations plus derived series aligned to them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TransformOutput {
    pub filtered: Vec<Observation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<Vec<Option<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_average: Option<Vec<Option<f64>>>,
}

impl TransformOutput {
    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// The series to plot: z-score when enabled, otherwise moving average,
    /// otherwise the raw values.
    pub fn display_values(&self) -> Vec<Option<f64>> {
        if let Some(z) = &self.z_score {
            return z.clone();
        }
        if let Some(ma) = &self.moving_average {
            return ma.clone();
        }
        self.filtered.iter().map(Observation::valid_value).collect()
    }
}

/// Run the display transform against an explicit reference instant.
///
/// Rolling statistics are computed over the whole history and then sliced
/// to the lookback, so the first points of a filtered view keep the values
/// their full trailing window gives them.
pub fn transform(
    series: &[Observation],
    params: &TransformParams,
    now: DateTime<Utc>,
) -> TransformOutput {
    let start = params.recency.start_index(series, now);
    let values: Vec<Option<f64>> = series.iter().map(Observation::valid_value).collect();

    let z_score = params
        .effective_z_score_window()
        .map(|w| rolling_z_score(&values, w, params.eviction)[start..].to_vec());
    if let (None, Some(w)) = (&z_score, params.z_score_window) {
        debug!(window = w, "z-score disabled: window must be at least 2");
    }

    let moving_average = params
        .effective_moving_average_period()
        .map(|p| rolling_mean(&values, p, params.eviction)[start..].to_vec());
    if let (None, Some(p)) = (&moving_average, params.moving_average_period) {
        debug!(period = p, "moving average disabled: period must be at least 1");
    }

    TransformOutput {
        filtered: series[start..].to_vec(),
        z_score,
        moving_average,
    }
}

/// Run the display transform against the current time.
pub fn transform_now(series: &[Observation], params: &TransformParams) -> TransformOutput {
    transform(series, params, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn daily(values: &[Option<f64>]) -> Vec<Observation> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(base + Duration::days(i as i64), v))
            .collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_series_gives_empty_output() {
        let params = TransformParams::new()
            .with_z_score(30)
            .with_moving_average(7);
        let out = transform(&[], &params, now());

        assert!(out.is_empty());
        assert_eq!(out.z_score, Some(vec![]));
        assert_eq!(out.moving_average, Some(vec![]));
    }

    #[test]
    fn disabled_statistics_are_absent() {
        let obs = daily(&[Some(1.0), Some(2.0)]);
        let out = transform(&obs, &TransformParams::new(), now());

        assert_eq!(out.len(), 2);
        assert!(out.z_score.is_none());
        assert!(out.moving_average.is_none());
    }

    #[test]
    fn invalid_windows_disable_rather_than_fail() {
        let obs = daily(&[Some(1.0), Some(2.0)]);
        let params = TransformParams::new()
            .with_z_score(1)
            .with_moving_average(0)
            .with_recency(RecencyFilter::AllTime);
        let out = transform(&obs, &params, now());

        assert!(out.z_score.is_none());
        assert!(out.moving_average.is_none());
        assert_eq!(out.filtered, obs);
    }

    #[test]
    fn effective_windows_match_what_transform_computes() {
        let cases = [
            (None, None),
            (Some(0), Some(0)),
            (Some(1), Some(1)),
            (Some(2), Some(2)),
        ];
        let obs = daily(&[Some(1.0), Some(4.0), Some(2.0)]);

        for (z, ma) in cases {
            let params = TransformParams {
                z_score_window: z,
                moving_average_period: ma,
                recency: RecencyFilter::AllTime,
                ..TransformParams::default()
            };
            let out = transform(&obs, &params, now());
            assert_eq!(out.z_score.is_some(), params.effective_z_score_window().is_some());
            assert_eq!(
                out.moving_average.is_some(),
                params.effective_moving_average_period().is_some()
            );
        }

        let params = TransformParams::new().with_z_score(1).with_moving_average(0);
        assert_eq!(params.effective_z_score_window(), None);
        assert_eq!(params.effective_moving_average_period(), None);
        let params = TransformParams::new().with_z_score(2).with_moving_average(1);
        assert_eq!(params.effective_z_score_window(), Some(2));
        assert_eq!(params.effective_moving_average_period(), Some(1));
    }

    #[test]
    fn statistics_are_computed_before_slicing() {
        // 400 daily points ending 2025-02-03; last-month view from 2025-02-04
        let values: Vec<Option<f64>> = (0..400).map(|i| Some((i % 7) as f64)).collect();
        let obs = daily(&values);
        let now = obs.last().unwrap().timestamp + Duration::days(1);
        let params = TransformParams::new()
            .with_z_score(90)
            .with_moving_average(30)
            .with_recency(RecencyFilter::LastMonth);

        let out = transform(&obs, &params, now);

        assert!(out.len() < obs.len());
        let z = out.z_score.as_ref().unwrap();
        let ma = out.moving_average.as_ref().unwrap();
        assert_eq!(z.len(), out.len());
        assert_eq!(ma.len(), out.len());
        assert!(z[0].is_some(), "first filtered point keeps its history");
        assert!(ma[0].is_some());

        let full = transform(
            &obs,
            &params.with_recency(RecencyFilter::AllTime),
            now,
        );
        let offset = obs.len() - out.len();
        assert_eq!(full.filtered[offset..], out.filtered[..]);
        assert_eq!(full.z_score.unwrap()[offset..], z[..]);
    }

    #[test]
    fn gapped_moving_average_count_based() {
        let obs = daily(&[Some(10.0), Some(20.0), Some(30.0), Some(40.0), None, Some(50.0)]);
        let params = TransformParams::new()
            .with_moving_average(3)
            .with_recency(RecencyFilter::AllTime);

        let out = transform(&obs, &params, now());
        assert_eq!(
            out.moving_average.unwrap(),
            vec![None, None, Some(20.0), Some(30.0), None, Some(40.0)]
        );
    }

    #[test]
    fn two_point_z_score() {
        let obs = daily(&[Some(1.0), Some(3.0)]);
        let params = TransformParams::new()
            .with_z_score(2)
            .with_recency(RecencyFilter::AllTime);

        let z = transform(&obs, &params, now()).z_score.unwrap();
        assert_eq!(z[0], None);
        assert_relative_eq!(z[1].unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn display_values_prefer_z_score() {
        let obs = daily(&[Some(1.0), Some(3.0), Some(2.0)]);
        let all = TransformParams::new().with_recency(RecencyFilter::AllTime);

        let raw = transform(&obs, &all, now());
        assert_eq!(raw.display_values(), vec![Some(1.0), Some(3.0), Some(2.0)]);

        let ma = transform(&obs, &all.with_moving_average(2), now());
        assert_eq!(ma.display_values(), vec![None, Some(2.0), Some(2.5)]);

        let both = transform(&obs, &all.with_moving_average(2).with_z_score(2), now());
        assert_eq!(both.display_values(), both.z_score.clone().unwrap());
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: TransformParams =
            serde_json::from_str(r#"{"z_score_window": 90, "recency": "year-to-date"}"#).unwrap();
        assert_eq!(params.z_score_window, Some(90));
        assert_eq!(params.moving_average_period, None);
        assert_eq!(params.recency, RecencyFilter::YearToDate);
        assert_eq!(params.eviction, EvictionPolicy::CountBased);
    }
}
