use crate::core::upload::CSV_MIME_TYPE;
use crate::domain::model::{AnalysisResponse, PredictionInput, PredictionResponse};
use crate::domain::ports::{ConfigProvider, RiskApi};
use crate::utils::error::{Result, RiskClientError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const ANALYZE_PATH: &str = "api/analyze";
const PREDICT_PATH: &str = "api/predict";

const ANALYZE_FALLBACK_MESSAGE: &str = "Error processing file";
const PREDICT_FALLBACK_MESSAGE: &str = "Error predicting diabetes";

/// 錯誤回應可能是 `{"detail": ...}` 或 `{"error": ...}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    error: Option<String>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            return Some(error);
        }
        match self.detail? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Null => None,
            // 驗證錯誤時 detail 是陣列
            other => Some(other.to_string()),
        }
    }
}

/// HTTP implementation of [`RiskApi`] backed by `reqwest`.
pub struct HttpRiskApi {
    client: Client,
    base_url: Url,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
}

impl HttpRiskApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: parse_base_url(base_url)?,
            timeout: None,
            headers: HashMap::new(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let api = Self::new(config.api_base_url())?;
        Ok(match config.timeout_seconds() {
            Some(seconds) => api.with_timeout(Duration::from_secs(seconds)),
            None => api,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RiskClientError::InvalidConfigValue {
                field: "api_base_url".to_string(),
                value: self.base_url.to_string(),
                reason: format!("Cannot build endpoint '{}': {}", path, e),
            })
    }

    fn prepare(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| fallback.to_string());

        tracing::warn!("API request failed with status {}: {}", status, message);
        Err(RiskClientError::ApiStatus {
            status: status.as_u16(),
            message,
        })
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    // join() 會丟掉最後一段路徑，確保結尾有斜線
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };

    Url::parse(&normalized).map_err(|e| RiskClientError::InvalidConfigValue {
        field: "api_base_url".to_string(),
        value: base_url.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

#[async_trait]
impl RiskApi for HttpRiskApi {
    async fn analyze(&self, file_name: &str, contents: Vec<u8>) -> Result<AnalysisResponse> {
        let url = self.endpoint(ANALYZE_PATH)?;
        tracing::info!("📤 Uploading {} ({} bytes) to {}", file_name, contents.len(), url);

        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str(CSV_MIME_TYPE)?;
        let form = Form::new().part("file", part);

        let response = self
            .prepare(self.client.post(url))
            .multipart(form)
            .send()
            .await
            .map_err(RiskClientError::UploadFailed)?;

        Self::read_json(response, ANALYZE_FALLBACK_MESSAGE).await
    }

    async fn predict(&self, input: &PredictionInput) -> Result<PredictionResponse> {
        let url = self.endpoint(PREDICT_PATH)?;
        tracing::info!("📤 Requesting prediction from {}", url);
        tracing::debug!("Prediction input: {:?}", input);

        let response = self
            .prepare(self.client.post(url))
            .json(input)
            .send()
            .await?;

        Self::read_json(response, PREDICT_FALLBACK_MESSAGE).await
    }
}
