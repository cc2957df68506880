use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::data::model::NumericPolicy;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(author, version, about = "Cross-filtering dashboard for vehicle fuel-economy data")]
pub struct Args {
    /// Dataset to open at startup (.csv, .tsv, .json or .parquet)
    pub data: Option<PathBuf>,
    /// Load dashboard settings from a JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Drop rows with malformed numeric cells instead of refusing the file
    #[arg(long, default_value_t = false)]
    pub skip_malformed: bool,
}

/// Dashboard settings. Every field has a default so a config file may set
/// any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: Option<PathBuf>,
    pub numeric_policy: NumericPolicy,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            numeric_policy: NumericPolicy::Strict,
            window_size: [1400.0, 900.0],
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = std::fs::read_to_string(path_ref)
            .with_context(|| format!("reading dashboard config {}", path_ref.display()))?;
        let config: DashboardConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing dashboard config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Config file (if any) with command-line flags layered on top.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(data) = &args.data {
            config.data_path = Some(data.clone());
        }
        if args.skip_malformed {
            config.numeric_policy = NumericPolicy::SkipRow;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_without_arguments() {
        let args = Args::parse_from(["mpg-dashboard"]);
        let cfg = DashboardConfig::from_args(&args).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
    }

    #[test]
    fn config_file_fills_missing_fields_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(br#"{"numeric_policy": "skip_row"}"#).unwrap();
        let cfg = DashboardConfig::load(temp.path()).unwrap();
        assert_eq!(cfg.numeric_policy, NumericPolicy::SkipRow);
        assert_eq!(cfg.window_size, [1400.0, 900.0]);
        assert!(cfg.data_path.is_none());
    }

    #[test]
    fn flags_override_config_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(br#"{"data_path": "old.csv", "window_size": [800, 600]}"#)
            .unwrap();
        let path = temp.path().to_string_lossy().to_string();

        let args = Args::parse_from([
            "mpg-dashboard",
            "cars.csv",
            "--config",
            path.as_str(),
            "--skip-malformed",
        ]);
        let cfg = DashboardConfig::from_args(&args).unwrap();
        assert_eq!(cfg.data_path, Some(PathBuf::from("cars.csv")));
        assert_eq!(cfg.numeric_policy, NumericPolicy::SkipRow);
        assert_eq!(cfg.window_size, [800.0, 600.0]);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"not json").unwrap();
        assert!(DashboardConfig::load(temp.path()).is_err());
    }
}
