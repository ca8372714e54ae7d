//! Observation and Series: the typed shape every transform consumes.

use crate::error::{Result, SeriesError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single dated value. `None` marks a period with no usable value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

impl Observation {
    /// Create an observation; non-finite values are stored as missing.
    pub fn new(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self {
            timestamp,
            value: value.filter(|v| v.is_finite()),
        }
    }

    pub fn missing(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            value: None,
        }
    }

    /// The value if present and finite.
    ///
    /// Fields are public, so an `Observation` can still carry `Some(NaN)`
    /// when built by hand; every statistic goes through this accessor.
    #[inline]
    pub fn valid_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }

    pub fn is_missing(&self) -> bool {
        self.valid_value().is_none()
    }
}

/// A named metric: observations in strictly increasing timestamp order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    name: String,
    observations: Vec<Observation>,
}

impl Series {
    /// Create a series, validating timestamp order.
    pub fn new(name: impl Into<String>, observations: Vec<Observation>) -> Result<Self> {
        for pair in observations.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::TimestampError(format!(
                    "timestamps must be strictly increasing ({} follows {})",
                    pair[1].timestamp, pair[0].timestamp
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            observations,
        })
    }

    /// Create a series from parallel timestamp and value vectors.
    pub fn from_parts(
        name: impl Into<String>,
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<Option<f64>>,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(SeriesError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        let observations = timestamps
            .into_iter()
            .zip(values)
            .map(|(t, v)| Observation::new(t, v))
            .collect();
        Self::new(name, observations)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.observations.iter().map(|o| o.timestamp).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.observations.iter().map(|o| o.valid_value()).collect()
    }

    /// Number of observations carrying a usable value.
    pub fn valid_count(&self) -> usize {
        self.observations.iter().filter(|o| !o.is_missing()).count()
    }

    pub fn has_missing_values(&self) -> bool {
        self.observations.iter().any(Observation::is_missing)
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.observations.first().map(|o| o.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.observations.last().map(|o| o.timestamp)
    }
}
