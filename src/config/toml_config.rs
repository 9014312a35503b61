use crate::config::ApiConfig;
use crate::utils::error::{Result, SkipError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: Option<ApiSection>,
    pub query: Option<QuerySection>,
    pub location: Option<LocationSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub image_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySection {
    pub stale_time_secs: Option<u64>,
}

/// 預設查詢地點
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSection {
    pub postcode: String,
    pub area: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SkipError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SKIP_API_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| SkipError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 將檔案中有設定的值套用到既有的 ApiConfig 上
    pub fn apply_to(&self, mut config: ApiConfig) -> ApiConfig {
        if let Some(api) = &self.api {
            if let Some(base_url) = &api.base_url {
                config.base_url = base_url.clone();
            }
            if let Some(timeout_ms) = api.timeout_ms {
                config.timeout_ms = timeout_ms;
            }
            if let Some(image_base_url) = &api.image_base_url {
                config.image_base_url = image_base_url.clone();
            }
        }
        if let Some(stale) = self.query.as_ref().and_then(|q| q.stale_time_secs) {
            config.stale_time_secs = stale;
        }
        config
    }

    pub fn api_config(&self) -> ApiConfig {
        self.apply_to(ApiConfig::default())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.api_config().validate()
    }
}
