use crate::config::toml_config::TomlConfig;
use crate::config::ApiConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_POSTCODE: &str = "NR32";
pub const DEFAULT_AREA: &str = "Lowestoft";

/// 命令列解析後實際使用的設定
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub api: ApiConfig,
    pub postcode: String,
    pub area: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "skip-slider")]
#[command(about = "Pick a skip size for a location and show its price card")]
pub struct CliConfig {
    #[arg(long, help = "Postcode to search (default: config file, then NR32)")]
    pub postcode: Option<String>,

    #[arg(long, help = "Area to search (default: config file, then Lowestoft)")]
    pub area: Option<String>,

    #[arg(long, help = "Requested size in yards; snapped to the nearest available size")]
    pub size: Option<f64>,

    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Override the skip API base URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Override the request timeout in milliseconds")]
    pub timeout_ms: Option<u64>,

    #[arg(long, help = "Print every option for the location")]
    pub list: bool,

    #[arg(long, help = "Print the render state as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 依序套用：預設值 → 環境變數 → 設定檔 → 命令列參數
    pub fn resolve(&self) -> Result<ResolvedSettings> {
        let mut config = ApiConfig::from_env()?;
        let mut postcode = DEFAULT_POSTCODE.to_string();
        let mut area = DEFAULT_AREA.to_string();

        if let Some(path) = &self.config {
            let file_config = TomlConfig::from_file(path)?;
            file_config.validate()?;
            config = file_config.apply_to(config);
            if let Some(location) = &file_config.location {
                postcode = location.postcode.clone();
                area = location.area.clone();
            }
        }

        if let Some(value) = &self.postcode {
            postcode = value.clone();
        }
        if let Some(value) = &self.area {
            area = value.clone();
        }

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }

        // postcode / area 空白不算錯誤，交給查詢層回傳空清單
        config.validate()?;

        Ok(ResolvedSettings {
            api: config,
            postcode,
            area,
        })
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            validate_url("base_url", base_url)?;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            validate_positive_number("timeout_ms", timeout_ms, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_parse() {
        let config = CliConfig::parse_from(["skip-slider"]);
        assert!(config.size.is_none());
        assert!(config.validate().is_ok());

        let settings = config.resolve().unwrap();
        assert_eq!(settings.postcode, "NR32");
        assert_eq!(settings.area, "Lowestoft");
    }

    #[test]
    fn test_flags_override_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                b"[api]\nbase_url = \"https://file.example.com/api\"\ntimeout_ms = 3000\n\n[location]\npostcode = \"IP1\"\narea = \"Ipswich\"\n",
            )
            .unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let config = CliConfig::parse_from([
            "skip-slider",
            "--config",
            &path,
            "--timeout-ms",
            "750",
            "--size",
            "7",
            "--area",
            "Felixstowe",
        ]);
        let settings = config.resolve().unwrap();

        assert_eq!(settings.api.base_url, "https://file.example.com/api");
        assert_eq!(settings.api.timeout_ms, 750);
        assert_eq!(settings.postcode, "IP1");
        assert_eq!(settings.area, "Felixstowe");
        assert_eq!(config.size, Some(7.0));
    }

    #[test]
    fn test_empty_location_is_not_a_config_error() {
        let config = CliConfig::parse_from(["skip-slider", "--postcode", ""]);
        assert!(config.validate().is_ok());

        let settings = config.resolve().unwrap();
        assert_eq!(settings.postcode, "");
        assert_eq!(settings.area, "Lowestoft");

        // 空白原樣保留
        let config = CliConfig::parse_from(["skip-slider", "--area", " "]);
        assert_eq!(config.resolve().unwrap().area, " ");
    }

    #[test]
    fn test_bad_flag_values_rejected() {
        let config = CliConfig::parse_from(["skip-slider", "--base-url", "ftp://example.com"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["skip-slider", "--timeout-ms", "0"]);
        assert!(config.validate().is_err());
    }
}
