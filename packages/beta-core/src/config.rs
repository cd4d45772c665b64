//! Configuration loaded from a TOML file.

use crate::risk::MIN_SAMPLES;
use crate::timeframe::{Benchmark, Frequency};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "BETACALC_CONFIG";

/// Runtime configuration.
///
/// Every field has a default, so a missing file or a partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Annual risk-free rate in percent
    pub risk_free_rate: f64,
    /// Minimum overlapping return observations
    pub min_samples: usize,
    /// Benchmark used when none is given
    pub default_benchmark: Benchmark,
    /// Analysis frequency
    pub frequency: Frequency,
    /// Upper bound on concurrent price fetches
    pub max_concurrent_fetches: usize,
    /// Lifetime of cached price series
    pub cache_ttl_secs: u64,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
    /// Base URL of the Yahoo chart API
    pub yahoo_base_url: String,
    /// Base URL of the mutual fund NAV API
    pub mfapi_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            risk_free_rate: 5.0,
            min_samples: MIN_SAMPLES,
            default_benchmark: Benchmark::Nifty50,
            frequency: Frequency::Monthly,
            max_concurrent_fetches: 4,
            cache_ttl_secs: 900,
            request_timeout_secs: 15,
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            mfapi_base_url: "https://api.mfapi.in".to_string(),
        }
    }
}

impl Config {
    /// Load from the default path, falling back to defaults if it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load from a specific path, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Default path: `<config dir>/betacalc/config.toml`
    /// Can be overridden with the `BETACALC_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        directories::ProjectDirs::from("", "", "betacalc")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("betacalc.toml"))
    }

    /// Check that values are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(Error::InvalidInput(
                "risk_free_rate must be a finite number".to_string(),
            ));
        }
        if self.min_samples < 2 {
            return Err(Error::InvalidInput(
                "min_samples must be at least 2".to_string(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(Error::InvalidInput(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Cache lifetime as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
risk_free_rate = 6.75
frequency = "daily"
default_benchmark = "SENSEX"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.risk_free_rate, 6.75);
        assert_eq!(config.frequency, Frequency::Daily);
        assert_eq!(config.default_benchmark, Benchmark::Sensex);
        assert_eq!(config.min_samples, MIN_SAMPLES);
        assert_eq!(config.cache_ttl(), Duration::from_secs(900));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_concurrent_fetches = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(Error::InvalidInput(_))
        ));

        fs::write(&path, "frequency = \"hourly\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Toml(_))));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = Config {
            min_samples: 36,
            ..Config::default()
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
