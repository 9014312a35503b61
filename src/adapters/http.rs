use crate::domain::model::{QueryKey, SkipListResponse, SkipOption};
use crate::domain::ports::{ConfigProvider, SkipSource};
use crate::utils::error::{Result, SkipError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

pub const BY_LOCATION_PATH: &str = "/skips/by-location";

/// 透過 HTTP 取得 skip 清單
#[derive(Debug, Clone)]
pub struct HttpSkipSource {
    client: Client,
    base_url: String,
}

impl HttpSkipSource {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms()))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, BY_LOCATION_PATH)
    }
}

#[async_trait]
impl SkipSource for HttpSkipSource {
    async fn fetch_by_location(&self, key: &QueryKey) -> Result<Vec<SkipOption>> {
        let url = self.endpoint();
        tracing::debug!("Making API request to: {} ({})", url, key);

        let response = self
            .client
            .get(&url)
            .query(&[("postcode", key.postcode()), ("area", key.area())])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(SkipError::HttpStatusError {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.bytes().await?;
        let parsed: SkipListResponse = serde_json::from_slice(&body)?;
        let options = parsed.into_options();

        tracing::debug!("Fetched {} skip options for {}", options.len(), key);
        Ok(options)
    }
}
