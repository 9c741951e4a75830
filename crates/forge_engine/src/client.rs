use std::time::Duration;

use forge_logging::{forge_debug, forge_info, forge_warn};
use reqwest::{Response, Url};

use crate::decode::{decode_submit_response, extract_error_message};
use crate::{ClientError, HealthReport, ResultsResponse, SubmitOutcome, SubmitRequest, TaskStatus};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The generation backend as seen by the client.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitOutcome, ClientError>;

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ClientError>;

    /// The results record; `manifest` is absent when the task failed, with `error` saying why.
    async fn results(&self, task_id: &str) -> Result<ResultsResponse, ClientError>;

    async fn health(&self) -> Result<HealthReport, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, ClientError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(settings.base_url.clone()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        forge_debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitOutcome, ClientError> {
        let url = self.endpoint(&["generate_idea"])?;
        forge_info!(
            "Submitting idea_len={} industry={}",
            request.idea.len(),
            request.industry
        );
        let response = self.client.post(url).json(request).send().await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        decode_submit_response(&body)
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ClientError> {
        let url = self.endpoint(&["status", task_id])?;
        self.get_json(url).await
    }

    async fn results(&self, task_id: &str) -> Result<ResultsResponse, ClientError> {
        let url = self.endpoint(&["results", task_id])?;
        self.get_json(url).await
    }

    async fn health(&self) -> Result<HealthReport, ClientError> {
        let url = self.endpoint(&["health"])?;
        self.get_json(url).await
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body);
    forge_warn!("Backend answered {}: {:?}", status, message);
    Err(ClientError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}
