//! Chart transforms for dashboard series.
//!
//! Provides trailing z-scores and moving averages that tolerate gaps,
//! lookback filters, and the pipeline that combines them.
//!
//! # Example
//!
//! ```
//! use chartseries::core::Observation;
//! use chartseries::transform::{transform, RecencyFilter, TransformParams};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let series: Vec<Observation> = [1.0, 3.0, 2.0, 5.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &v)| Observation::new(base + Duration::days(i as i64), Some(v)))
//!     .collect();
//!
//! let params = TransformParams::new()
//!     .with_z_score(2)
//!     .with_moving_average(3)
//!     .with_recency(RecencyFilter::AllTime);
//!
//! let out = transform(&series, &params, base + Duration::days(10));
//! assert_eq!(out.len(), 4);
//! assert_eq!(out.moving_average.unwrap()[2], Some(2.0));
//! ```

pub mod pipeline;
pub mod recency;
pub mod window;

pub use pipeline::{transform, transform_now, TransformOutput, TransformParams};
pub use recency::RecencyFilter;
pub use window::{rolling_mean, rolling_z_score, EvictionPolicy, RollingWindowState};
