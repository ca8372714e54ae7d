//! Frame: several named metrics sharing one timestamp axis.

use crate::core::series::{Observation, Series};
use crate::error::{Result, SeriesError};
use chrono::{DateTime, Utc};

/// Named metrics over a shared, strictly increasing timestamp axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    timestamps: Vec<DateTime<Utc>>,
    /// Column-major: columns[metric][observation]
    columns: Vec<Vec<Option<f64>>>,
    labels: Vec<String>,
}

/// Builder for constructing a Frame.
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    timestamps: Vec<DateTime<Utc>>,
    columns: Vec<Vec<Option<f64>>>,
    labels: Vec<String>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Add a named column.
    pub fn column(mut self, label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.labels.push(label.into());
        self.columns.push(values);
        self
    }

    pub fn build(self) -> Result<Frame> {
        Frame::new(self.timestamps, self.labels, self.columns)
    }
}

impl Frame {
    /// Create a frame, validating ordering, column lengths and labels.
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        labels: Vec<String>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(SeriesError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        if labels.len() != columns.len() {
            return Err(SeriesError::DimensionMismatch {
                expected: columns.len(),
                got: labels.len(),
            });
        }

        for column in &columns {
            if column.len() != timestamps.len() {
                return Err(SeriesError::DimensionMismatch {
                    expected: timestamps.len(),
                    got: column.len(),
                });
            }
        }

        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(SeriesError::InvalidParameter(format!(
                    "duplicate metric label '{label}'"
                )));
            }
        }

        let columns = columns
            .into_iter()
            .map(|col| col.into_iter().map(|v| v.filter(|x| x.is_finite())).collect())
            .collect();

        Ok(Self {
            timestamps,
            columns,
            labels,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of metrics.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn has_metric(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }

    /// Raw values for a metric.
    pub fn column(&self, name: &str) -> Result<&[Option<f64>]> {
        self.labels
            .iter()
            .position(|l| l == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| SeriesError::UnknownMetric(name.to_string()))
    }

    /// Extract one metric as a Series.
    pub fn series(&self, name: &str) -> Result<Series> {
        let column = self.column(name)?;
        let observations = self
            .timestamps
            .iter()
            .zip(column)
            .map(|(&t, &v)| Observation::new(t, v))
            .collect();
        Series::new(name, observations)
    }

    /// Rows `[start, end)` as a new frame.
    pub fn slice(&self, start: usize, end: usize) -> Result<Frame> {
        if start > end {
            return Err(SeriesError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(SeriesError::InvalidParameter(format!(
                "slice end {end} exceeds frame length {}",
                self.len()
            )));
        }

        Ok(Frame {
            timestamps: self.timestamps[start..end].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|col| col[start..end].to_vec())
                .collect(),
            labels: self.labels.clone(),
        })
    }
}
