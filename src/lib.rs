//! # chartseries
//!
//! Data core for a static-file analytics dashboard.
//!
//! Snapshots (open-interest indices, sentiment summaries, backtest
//! results) are read once into typed series, then turned into chart-ready
//! output: trailing z-scores and moving averages that tolerate gaps,
//! sliced to a lookback window after being computed over the full history.

pub mod backtest;
pub mod core;
pub mod error;
pub mod ingest;
pub mod settings;
pub mod source;
pub mod transform;
pub mod view;

pub use error::{Result, SeriesError};

pub mod prelude {
    pub use crate::core::{Frame, FrameBuilder, Observation, Series};
    pub use crate::error::{Result, SeriesError};
    pub use crate::source::{load_frame, DataSource, DirSource, SnapshotSchema};
    pub use crate::transform::{
        transform, transform_now, EvictionPolicy, RecencyFilter, TransformOutput,
        TransformParams,
    };
    pub use crate::view::{ChartView, Ticket};
}
