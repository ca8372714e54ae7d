//! Core data structures for dashboard time series.

mod frame;
mod series;

pub use frame::{Frame, FrameBuilder};
pub use series::{Observation, Series};
