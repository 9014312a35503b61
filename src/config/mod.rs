#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SkipError};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://app.wewantwaste.co.uk/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_STALE_TIME_SECS: u64 = 5 * 60;
pub const DEFAULT_IMAGE_BASE_URL: &str =
    "https://yozbrydxdlcxghkphhtq.supabase.co/storage/v1/object/public/skips/skip-sizes";

pub const ENV_BASE_URL: &str = "SKIP_API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "SKIP_API_TIMEOUT_MS";
pub const ENV_STALE_TIME_SECS: &str = "SKIP_STALE_TIME_SECS";

/// 連線與快取設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub stale_time_secs: u64,
    pub image_base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            stale_time_secs: DEFAULT_STALE_TIME_SECS,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    /// 以環境變數覆寫預設值
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            if !base_url.is_empty() {
                self.base_url = base_url;
            }
        }
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_env_u64(ENV_TIMEOUT_MS, &raw)?;
        }
        if let Ok(raw) = std::env::var(ENV_STALE_TIME_SECS) {
            self.stale_time_secs = parse_env_u64(ENV_STALE_TIME_SECS, &raw)?;
        }
        Ok(self)
    }
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| SkipError::InvalidConfigValueError {
            field: name.to_string(),
            value: raw.to_string(),
            reason: format!("Expected an unsigned integer: {}", e),
        })
}

impl ConfigProvider for ApiConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    fn image_base_url(&self) -> &str {
        &self.image_base_url
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.base_url)?;
        validate_url("api.image_base_url", &self.image_base_url)?;
        validate_positive_number("api.timeout_ms", self.timeout_ms, 1)?;
        validate_positive_number("query.stale_time_secs", self.stale_time_secs, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upstream_widget() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url(), "https://app.wewantwaste.co.uk/api");
        assert_eq!(config.timeout_ms(), 10_000);
        assert_eq!(config.stale_time(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var(ENV_TIMEOUT_MS, "2500");
        let config = ApiConfig::from_env().unwrap();
        std::env::remove_var(ENV_TIMEOUT_MS);

        assert_eq!(config.timeout_ms, 2500);
    }

    #[test]
    fn test_invalid_env_value() {
        assert!(parse_env_u64(ENV_STALE_TIME_SECS, "soon").is_err());
        assert_eq!(parse_env_u64(ENV_STALE_TIME_SECS, " 60 ").unwrap(), 60);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ApiConfig {
            timeout_ms: 0,
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
