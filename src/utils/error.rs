use std::sync::Arc;
use thiserror::Error;

/// 錯誤分類，用於日誌與 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

// 同一個進行中的請求結果會交給所有等待者，所以錯誤必須可 Clone
#[derive(Error, Debug, Clone)]
pub enum SkipError {
    #[error("API request failed: {0}")]
    ApiError(Arc<reqwest::Error>),

    #[error("API returned status {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Serialization error: {0}")]
    SerializationError(Arc<serde_json::Error>),

    #[error("IO error: {0}")]
    IoError(Arc<std::io::Error>),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Background fetch task failed: {message}")]
    TaskError { message: String },
}

impl From<reqwest::Error> for SkipError {
    fn from(e: reqwest::Error) -> Self {
        SkipError::ApiError(Arc::new(e))
    }
}

impl From<serde_json::Error> for SkipError {
    fn from(e: serde_json::Error) -> Self {
        SkipError::SerializationError(Arc::new(e))
    }
}

impl From<std::io::Error> for SkipError {
    fn from(e: std::io::Error) -> Self {
        SkipError::IoError(Arc::new(e))
    }
}

impl SkipError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SkipError::ApiError(_) | SkipError::HttpStatusError { .. } => ErrorCategory::Network,
            SkipError::SerializationError(_) => ErrorCategory::Data,
            SkipError::IoError(_) | SkipError::TaskError { .. } => ErrorCategory::System,
            SkipError::ConfigError { .. }
            | SkipError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 是否屬於呼叫端可以自行重試的錯誤（服務本身不重試）
    pub fn is_retryable(&self) -> bool {
        match self {
            SkipError::ApiError(_) => true,
            SkipError::HttpStatusError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SkipError::ApiError(_) => "Check the network connection and the API base URL, then try again",
            SkipError::HttpStatusError { .. } => "The skip API rejected the request; verify postcode and area or try again later",
            SkipError::SerializationError(_) => "The skip API returned an unexpected payload; check the API version",
            SkipError::IoError(_) => "Check file permissions and that the path exists",
            SkipError::TaskError { .. } => "Retry the request; the fetch task stopped unexpectedly",
            SkipError::ConfigError { .. }
            | SkipError::InvalidConfigValueError { .. } => "Fix the configuration file or command line flags",
        }
    }

    /// 給終端使用者看的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Data => "Could not load skips".to_string(),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SkipError>;
