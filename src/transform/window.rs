//! Trailing window statistics over series with gaps.
//!
//! Missing values never enter the window; they still occupy an output slot
//! (always `None`). Aggregates are updated incrementally and recomputed
//! exactly once per `window` pushes.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How old entries leave a trailing window when the series has gaps.
///
/// The two policies agree on gap-free input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
    /// The window holds the last `window` valid observations, however far
    /// back they reach.
    #[default]
    CountBased,
    /// The window holds the valid observations among the last `window`
    /// positions; gaps shrink it.
    Positional,
}

impl std::str::FromStr for EvictionPolicy {
    type Err = crate::error::SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "count" | "count-based" | "countbased" => Ok(Self::CountBased),
            "positional" | "position" => Ok(Self::Positional),
            other => Err(crate::error::SeriesError::InvalidParameter(format!(
                "unknown eviction policy '{other}'"
            ))),
        }
    }
}

/// Running aggregates for a trailing window.
///
/// Sums are kept relative to a shift to limit cancellation in
/// `sum_sq / n - mean²`. The shift is moved to the exact window mean every
/// `window` pushes, and whenever an evicted entry carried most of `sum_sq`.
#[derive(Debug, Clone)]
pub struct RollingWindowState {
    window: usize,
    policy: EvictionPolicy,
    /// (position, value) of every valid observation currently inside.
    entries: VecDeque<(usize, f64)>,
    shift: f64,
    sum: f64,
    sum_sq: f64,
    /// Position where the current run of identical values started.
    run_start: usize,
    pushes_since_rebase: usize,
}

impl RollingWindowState {
    pub fn new(window: usize, policy: EvictionPolicy) -> Self {
        Self {
            window,
            policy,
            entries: VecDeque::with_capacity(window.min(4096)),
            shift: 0.0,
            sum: 0.0,
            sum_sq: 0.0,
            run_start: 0,
            pushes_since_rebase: 0,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Number of valid observations inside the window.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add the valid value observed at `position`, then evict expired entries.
    ///
    /// Positions must be pushed in increasing order.
    pub fn push(&mut self, position: usize, value: f64) {
        match self.entries.back() {
            None => {
                self.shift = value;
                self.sum = 0.0;
                self.sum_sq = 0.0;
                self.run_start = position;
                self.pushes_since_rebase = 0;
            }
            Some(&(_, last)) if last != value => self.run_start = position,
            Some(_) => {}
        }

        let d = value - self.shift;
        self.sum += d;
        self.sum_sq += d * d;
        self.entries.push_back((position, value));
        self.pushes_since_rebase += 1;

        let dominant_evicted = self.evict(position);
        if dominant_evicted || self.pushes_since_rebase >= self.window {
            self.rebase();
        }
    }

    /// Drop expired entries. Returns true if one of them held more than
    /// half of `sum_sq`, leaving the remainder dominated by rounding.
    fn evict(&mut self, position: usize) -> bool {
        let mut dominant = false;
        while let Some(&(front_pos, front_value)) = self.entries.front() {
            let expired = match self.policy {
                EvictionPolicy::CountBased => self.entries.len() > self.window,
                EvictionPolicy::Positional => front_pos + self.window <= position,
            };
            if !expired {
                break;
            }

            self.entries.pop_front();
            let d = front_value - self.shift;
            dominant |= d * d > 0.5 * self.sum_sq;
            self.sum -= d;
            self.sum_sq -= d * d;
        }
        dominant
    }

    /// Recompute the sums exactly around the current window mean.
    fn rebase(&mut self) {
        self.pushes_since_rebase = 0;
        let n = self.entries.len();
        if n == 0 {
            return;
        }

        let shift = self.entries.iter().map(|&(_, v)| v).sum::<f64>() / n as f64;
        let (sum, sum_sq) = self.entries.iter().fold((0.0, 0.0), |(s, sq), &(_, v)| {
            let d = v - shift;
            (s + d, sq + d * d)
        });
        self.shift = shift;
        self.sum = sum;
        self.sum_sq = sum_sq;
    }

    /// Every value inside the window is identical.
    fn is_constant(&self) -> bool {
        self.entries
            .front()
            .is_some_and(|&(front_pos, _)| front_pos >= self.run_start)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        if self.is_constant() {
            return self.entries.back().map(|&(_, v)| v);
        }
        Some(self.shift + self.sum / self.count() as f64)
    }

    /// Population variance; needs at least two entries.
    pub fn variance(&self) -> Option<f64> {
        let n = self.count();
        if n < 2 {
            return None;
        }
        if self.is_constant() {
            return Some(0.0);
        }
        let n = n as f64;
        let m = self.sum / n;
        Some((self.sum_sq / n - m * m).max(0.0))
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Standard score of `value` against the window; `None` when the
    /// window holds fewer than two entries or has zero spread.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        let sd = self.std_dev()?;
        if sd == 0.0 {
            return None;
        }
        let mean = self.mean()?;
        let z = (value - mean) / sd;
        z.is_finite().then_some(z)
    }
}

/// Trailing z-score.
///
/// Windows smaller than 2 yield all `None`.
pub fn rolling_z_score(
    values: &[Option<f64>],
    window: usize,
    policy: EvictionPolicy,
) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }

    let mut state = RollingWindowState::new(window, policy);
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = v.filter(|x| x.is_finite())?;
            state.push(i, x);
            state.z_score(x)
        })
        .collect()
}

/// Trailing simple moving average.
///
/// A point gets a value only when the window holds exactly `period` valid
/// observations. A zero period yields all `None`.
pub fn rolling_mean(
    values: &[Option<f64>],
    period: usize,
    policy: EvictionPolicy,
) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let mut state = RollingWindowState::new(period, policy);
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = v.filter(|x| x.is_finite())?;
            state.push(i, x);
            if state.count() == period {
                state.mean()
            } else {
                None
            }
        })
        .collect()
}
