//! Dashboard configuration: TOML file plus `CHARTSERIES_` environment
//! overrides (`CHARTSERIES_TRANSFORM__Z_SCORE_WINDOW=90`).

use crate::error::Result;
use crate::source::SnapshotSchema;
use crate::transform::TransformParams;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory the snapshot files are served from.
    pub data_dir: PathBuf,
    /// Default chart parameters.
    pub transform: TransformParams,
    pub schema: SnapshotSchema,
    pub backtest: BacktestSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("dashboard_data"),
            transform: TransformParams::default(),
            schema: SnapshotSchema::default(),
            backtest: BacktestSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// Label shown next to the benchmark return.
    pub benchmark_asset: String,
    /// Legs to read; empty reads every asset in the file.
    pub assets: Vec<String>,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            benchmark_asset: "Bitcoin".to_string(),
            assets: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Load from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("CHARTSERIES")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{EvictionPolicy, RecencyFilter};
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let cfg = DashboardConfig::load(None).unwrap();
        assert_eq!(cfg.schema.csv.date_column, "Date");
        assert_eq!(cfg.backtest.benchmark_asset, "Bitcoin");
    }

    #[test]
    fn reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
data_dir = "/srv/dashboard"

[transform]
z_score_window = 90
moving_average_period = 30
recency = "last-quarter"
eviction = "positional"

[schema.csv]
date_column = "date"
"#
        )
        .unwrap();

        let cfg = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/dashboard"));
        assert_eq!(cfg.transform.z_score_window, Some(90));
        assert_eq!(cfg.transform.moving_average_period, Some(30));
        assert_eq!(cfg.transform.recency, RecencyFilter::LastQuarter);
        assert_eq!(cfg.transform.eviction, EvictionPolicy::Positional);
        assert_eq!(cfg.schema.csv.date_column, "date");
        assert_eq!(cfg.schema.json.date_field, "date");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(DashboardConfig::load(Some(Path::new("/nonexistent/chartseries.toml"))).is_err());
    }
}
