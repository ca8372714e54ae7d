//! Per-chart state: the raw frame, the current parameters, and the last
//! accepted result.
//!
//! Each chart owns one `ChartView`; views share nothing. Every parameter
//! change bumps a generation counter. A computed result is only accepted
//! if it was produced for the current generation, so a slow computation
//! finishing after a newer request is dropped.

use crate::core::{Frame, Observation, Series};
use crate::error::Result;
use crate::transform::{transform, TransformOutput, TransformParams};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Identifies the request a computation was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    metric: usize,
    params: TransformParams,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }
}

#[derive(Debug, Clone)]
pub struct ChartView {
    frame: Frame,
    series: Vec<Series>,
    metric: usize,
    params: TransformParams,
    generation: u64,
    output: Option<TransformOutput>,
}

impl ChartView {
    /// Create a view over `frame`, showing `metric`.
    pub fn new(frame: Frame, metric: &str, params: TransformParams) -> Result<Self> {
        let series = frame
            .labels()
            .iter()
            .map(|label| frame.series(label))
            .collect::<Result<Vec<_>>>()?;
        let metric = index_of(&frame, metric)?;

        Ok(Self {
            frame,
            series,
            metric,
            params,
            generation: 0,
            output: None,
        })
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn metric(&self) -> &str {
        &self.frame.labels()[self.metric]
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    pub fn output(&self) -> Option<&TransformOutput> {
        self.output.as_ref()
    }

    /// The ticket for the current state.
    pub fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
            metric: self.metric,
            params: self.params,
        }
    }

    /// Change the parameters; invalidates any pending computation.
    pub fn set_params(&mut self, params: TransformParams) -> Ticket {
        self.params = params;
        self.bump()
    }

    /// Switch the displayed metric; invalidates any pending computation.
    pub fn select_metric(&mut self, metric: &str) -> Result<Ticket> {
        self.metric = index_of(&self.frame, metric)?;
        Ok(self.bump())
    }

    fn bump(&mut self) -> Ticket {
        self.generation += 1;
        self.output = None;
        self.ticket()
    }

    /// Run the transform for `ticket`. Pure; does not touch the view.
    pub fn compute(&self, ticket: &Ticket, now: DateTime<Utc>) -> TransformOutput {
        transform(
            self.series[ticket.metric].observations(),
            &ticket.params,
            now,
        )
    }

    /// Store `output` if `ticket` is still current. Returns whether it was kept.
    pub fn accept(&mut self, ticket: &Ticket, output: TransformOutput) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded chart result"
            );
            return false;
        }
        self.output = Some(output);
        true
    }

    /// Compute and accept in one step.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> &TransformOutput {
        let ticket = self.ticket();
        let output = self.compute(&ticket, now);
        self.output.insert(output)
    }

    /// Min and max of the displayed values, ignoring gaps.
    pub fn extent(&self) -> Option<(f64, f64)> {
        let output = self.output.as_ref()?;
        extent(&output.display_values())
    }

    /// Index of the first filtered observation at or after `t`, clamped to
    /// the last one. Used for hover lookups.
    pub fn nearest_index(&self, t: DateTime<Utc>) -> Option<usize> {
        let output = self.output.as_ref()?;
        nearest_index(&output.filtered, t)
    }
}

fn index_of(frame: &Frame, metric: &str) -> Result<usize> {
    frame
        .labels()
        .iter()
        .position(|l| l == metric)
        .ok_or_else(|| crate::error::SeriesError::UnknownMetric(metric.to_string()))
}

/// Min and max over present values.
pub fn extent(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Left bisection on timestamps, clamped to the last index.
pub fn nearest_index(observations: &[Observation], t: DateTime<Utc>) -> Option<usize> {
    if observations.is_empty() {
        return None;
    }
    let i = observations.partition_point(|o| o.timestamp < t);
    Some(i.min(observations.len() - 1))
}
