//! TOML configuration for periodscan.
//!
//! Every field has a compiled-in default, so an empty file (or no file at
//! all) yields the standard analysis: 5-minute samples over 5 days, the 5
//! lowest frequency bins discarded, scores above 0.1 retained.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Environment variable naming a config file to load.
pub const CONFIG_ENV: &str = "PERIODSCAN_CONFIG";

/// Standard system location checked when no path is given.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/periodscan/periodscan.toml";

/// Longest lookback accepted, about ten years.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScanConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded scan configuration");
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. The path in the `PERIODSCAN_CONFIG` environment variable.
    /// 2. `/etc/periodscan/periodscan.toml`.
    /// 3. Compiled-in defaults.
    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "PERIODSCAN_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let system_path = Path::new(SYSTEM_CONFIG_PATH);
        if system_path.exists() {
            match Self::load(system_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %system_path.display(),
                        error = %e,
                        "system config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }

    /// Serialize back to TOML (used by `print-config`).
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Parameters of the spectral scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sampling granularity in minutes; also the time unit of reported periods.
    pub granularity_minutes: f64,
    /// How far back the source query reaches.
    pub lookback_days: u32,
    /// Number of lowest-frequency bins (DC included) dropped before the peak search.
    pub dc_offset: usize,
    /// Scores must be strictly greater than this to be retained.
    pub threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            granularity_minutes: 5.0,
            lookback_days: 5,
            dc_offset: 5,
            threshold: 0.1,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.granularity_minutes.is_finite() || self.granularity_minutes <= 0.0 {
            bail!(
                "analysis.granularity_minutes must be a positive number, got {}",
                self.granularity_minutes
            );
        }
        if self.lookback_days == 0 || self.lookback_days > MAX_LOOKBACK_DAYS {
            bail!(
                "analysis.lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}, got {}",
                self.lookback_days
            );
        }
        if self.dc_offset == 0 {
            bail!("analysis.dc_offset must be at least 1 so the DC bin is never scored");
        }
        if !(0.0..1.0).contains(&self.threshold) {
            bail!("analysis.threshold must be in [0, 1), got {}", self.threshold);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Remote chart API settings. The API token is never read from this file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the metrics store, e.g. `https://acme.wavefront.com`.
    pub base_url: Option<String>,
    /// Request timeout for the single chart query.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = ScanConfig::default();

        assert_eq!(cfg.analysis.granularity_minutes, 5.0);
        assert_eq!(cfg.analysis.lookback_days, 5);
        assert_eq!(cfg.analysis.dc_offset, 5);
        assert_eq!(cfg.analysis.threshold, 0.1);
        assert!(cfg.analysis.validate().is_ok());

        assert!(cfg.source.base_url.is_none());
        assert_eq!(cfg.source.timeout_secs, 30);

        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_example_toml() {
        let toml_str = r#"
[analysis]
granularity_minutes = 1.0
lookback_days = 2
dc_offset = 3
threshold = 0.25

[source]
base_url = "https://metrics.example.com"
timeout_secs = 10

[logging]
level = "debug"
format = "json"
"#;
        let cfg = ScanConfig::from_toml(toml_str).unwrap();
        assert_eq!(cfg.analysis.granularity_minutes, 1.0);
        assert_eq!(cfg.analysis.lookback_days, 2);
        assert_eq!(cfg.analysis.dc_offset, 3);
        assert_eq!(cfg.analysis.threshold, 0.25);
        assert_eq!(
            cfg.source.base_url.as_deref(),
            Some("https://metrics.example.com")
        );
        assert_eq!(cfg.source.timeout_secs, 10);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = ScanConfig::from_toml("[analysis]\nthreshold = 0.3\n").unwrap();
        assert_eq!(cfg.analysis.threshold, 0.3);
        assert_eq!(cfg.analysis.dc_offset, 5);
        assert_eq!(cfg.source, SourceConfig::default());
    }

    #[test]
    fn test_invalid_analysis_rejected() {
        assert!(ScanConfig::from_toml("[analysis]\ngranularity_minutes = 0.0\n").is_err());
        assert!(ScanConfig::from_toml("[analysis]\nthreshold = 1.5\n").is_err());
        assert!(ScanConfig::from_toml("[analysis]\nlookback_days = 0\n").is_err());
    }

    #[test]
    fn test_lookback_is_capped() {
        assert!(ScanConfig::from_toml("[analysis]\nlookback_days = 3650\n").is_ok());
        let err = ScanConfig::from_toml("[analysis]\nlookback_days = 4000000000\n").unwrap_err();
        assert!(err.to_string().contains("lookback_days"));
    }

    #[test]
    fn test_dc_offset_must_drop_the_dc_bin() {
        let err = ScanConfig::from_toml("[analysis]\ndc_offset = 0\n").unwrap_err();
        assert!(err.to_string().contains("dc_offset"));
        assert!(ScanConfig::from_toml("[analysis]\ndc_offset = 1\n").is_ok());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let cfg = ScanConfig::default();
        let text = cfg.to_toml().unwrap();
        assert!(text.contains("dc_offset = 5"));
        assert_eq!(ScanConfig::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("periodscan.toml");
        std::fs::write(&path, "[analysis]\ndc_offset = 2\n").unwrap();
        let cfg = ScanConfig::load(&path).unwrap();
        assert_eq!(cfg.analysis.dc_offset, 2);

        assert!(ScanConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
