//! Backtest result files: per-date portfolio rows and the summary panel.

mod metrics;
mod records;

pub use metrics::{format_metric, panel, parse_metrics, MetricRow, MetricValue, PanelItem};
pub use records::{
    asset_series, benchmark_series, discover_assets, parse_backtest, parse_backtest_with_report,
    portfolio_series, position_counts, positions, rebase, AssetLeg, BacktestRecord, Position,
};
