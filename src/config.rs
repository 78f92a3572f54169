//! Run configuration, loaded from an optional JSON file.
//!
//! ```json
//! {
//!   "daily_csv": "data/day_data.csv",
//!   "hourly_csv": "data/hour_data.csv.gz",
//!   "count_window": { "start": "2011-01-01", "end": "2012-12-31" },
//!   "rfm_top": 5,
//!   "output_dir": "rollups",
//!   "gzip": false
//! }
//! ```
//!
//! Every key is optional. CLI flags override file values.

use crate::aggregators::totals::CountWindow;
use crate::pipeline::RollupSettings;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RollupConfig {
    pub daily_csv: PathBuf,
    pub hourly_csv: PathBuf,
    pub count_window: CountWindow,
    pub rfm_top: usize,
    pub output_dir: PathBuf,
    pub gzip: bool,
}

impl Default for RollupConfig {
    fn default() -> Self {
        let settings = RollupSettings::default();
        Self {
            daily_csv: PathBuf::from("day_data.csv"),
            hourly_csv: PathBuf::from("hour_data.csv"),
            count_window: settings.count_window,
            rfm_top: settings.rfm_top,
            output_dir: PathBuf::from("rollups"),
            gzip: false,
        }
    }
}

impl RollupConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.count_window.start > self.count_window.end {
            bail!(
                "count_window.start {} is after count_window.end {}",
                self.count_window.start,
                self.count_window.end
            );
        }
        if self.rfm_top == 0 {
            bail!("rfm_top must be at least 1");
        }
        Ok(())
    }

    pub fn settings(&self) -> RollupSettings {
        RollupSettings {
            count_window: self.count_window,
            rfm_top: self.rfm_top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = RollupConfig::load_or_default(None).unwrap();
        assert_eq!(config, RollupConfig::default());
        assert_eq!(config.rfm_top, 5);
        assert_eq!(config.daily_csv, PathBuf::from("day_data.csv"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(r#"{ "rfm_top": 3, "gzip": true }"#);
        let config = RollupConfig::load(file.path()).unwrap();
        assert_eq!(config.rfm_top, 3);
        assert!(config.gzip);
        assert_eq!(config.hourly_csv, PathBuf::from("hour_data.csv"));
        assert_eq!(config.settings().rfm_top, 3);
    }

    #[test]
    fn test_count_window_parsed() {
        let file = write_config(
            r#"{ "count_window": { "start": "2012-01-01", "end": "2012-07-01" } }"#,
        );
        let config = RollupConfig::load(file.path()).unwrap();
        assert_eq!(
            config.count_window.start,
            NaiveDate::from_ymd_opt(2012, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config(r#"{ "rfm_top": 0 }"#);
        assert!(RollupConfig::load(file.path()).is_err());

        let file = write_config(
            r#"{ "count_window": { "start": "2012-01-01", "end": "2011-01-01" } }"#,
        );
        assert!(RollupConfig::load(file.path()).is_err());

        let file = write_config(r#"{ "unknown_key": 1 }"#);
        assert!(RollupConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(RollupConfig::load("/nonexistent/rollup.json").is_err());
    }
}
