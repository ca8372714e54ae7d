//! Error types for the chartseries library.

use thiserror::Error;

/// Result type alias for series operations.
pub type Result<T> = std::result::Result<T, SeriesError>;

/// Errors that can occur while loading or shaping series.
///
/// The transform itself never fails; missing data is expressed as `None`
/// in its output. These errors come from the ingestion boundary and from
/// structural validation.
#[derive(Error, Debug)]
pub enum SeriesError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// A column required by the schema is absent from the header.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A metric was requested that the frame does not carry.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// The snapshot format could not be determined or is not supported.
    #[error("unsupported snapshot format: {0}")]
    UnsupportedFormat(String),

    /// A requested path resolves outside the data directory.
    #[error("path escapes data directory: {0}")]
    PathOutsideRoot(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}
