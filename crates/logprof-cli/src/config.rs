use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved run configuration.
///
/// `report_size` is a *time-sum floor*: a URL appears in the report only when
/// its cumulative elapsed time exceeds this value. It is not a row-count cap,
/// despite what the name suggests; the key is kept for compatibility with
/// existing config files.
#[derive(Debug, Clone)]
pub struct Config {
    pub report_size: f64,
    pub report_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Ceiling (percent, 0-100) on the parse-error ratio before a run aborts.
    pub error_percent: f64,
    /// Where to write the application log; stderr when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_size: 1000.0,
            report_dir: PathBuf::from("./reports"),
            log_dir: PathBuf::from("./log"),
            error_percent: 50.0,
            log_file: None,
        }
    }
}

/// On-disk form: every key optional, unknown keys rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
struct ConfigFile {
    report_size: Option<f64>,
    report_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    error_percent: Option<f64>,
    log_file: Option<PathBuf>,
}

impl Config {
    /// Load a JSON config file, overlaying its values on the built-in defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let file: ConfigFile = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        let defaults = Self::default();
        let config = Self {
            report_size: file.report_size.unwrap_or(defaults.report_size),
            report_dir: file.report_dir.unwrap_or(defaults.report_dir),
            log_dir: file.log_dir.unwrap_or(defaults.log_dir),
            error_percent: file.error_percent.unwrap_or(defaults.error_percent),
            log_file: file.log_file,
        };
        ensure!(
            (0.0..=100.0).contains(&config.error_percent),
            "ERROR_PERCENT must be between 0 and 100, got {}",
            config.error_percent
        );
        ensure!(
            config.report_size >= 0.0,
            "REPORT_SIZE must not be negative, got {}",
            config.report_size
        );
        Ok(config)
    }
}
