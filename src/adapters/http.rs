use crate::config::toml_config::SourceConfig;
use crate::core::extractor::parse_entry;
use crate::domain::model::{ApiEnvelope, MedicineRecord};
use crate::domain::ports::EntrySource;
use crate::utils::error::{EtlError, FetchFailure, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

const SUCCESS_CODE: i64 = 200;

/// 藥典目錄 API：`GET {endpoint}/{entry_id}`
pub struct HttpEntrySource {
    client: Client,
    endpoint: String,
}

impl HttpEntrySource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                EtlError::InvalidConfigValueError {
                    field: "source.headers".to_string(),
                    value: key.clone(),
                    reason: e.to_string(),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                EtlError::InvalidConfigValueError {
                    field: format!("source.headers.{}", key),
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn entry_url(&self, entry_id: u64) -> String {
        format!("{}/{}", self.endpoint, entry_id)
    }
}

#[async_trait]
impl EntrySource for HttpEntrySource {
    async fn fetch(&self, entry_id: u64) -> std::result::Result<MedicineRecord, FetchFailure> {
        let url = self.entry_url(entry_id);
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(FetchFailure::HttpStatus(status.as_u16()));
        }

        let envelope: ApiEnvelope = response.json().await?;
        if envelope.code != SUCCESS_CODE {
            return Err(FetchFailure::PayloadCode(envelope.code));
        }
        let payload = envelope.data.ok_or(FetchFailure::EmptyData)?;

        parse_entry(entry_id, payload)
    }
}
