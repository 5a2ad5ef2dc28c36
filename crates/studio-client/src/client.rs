//! Studio API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use studio_models::{JobId, StatusSnapshot, SubmitRequest, SubmitResponse};
use tracing::{debug, warn};

use crate::api::JobApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Client for the studio job API.
pub struct StudioClient {
    http: Client,
    config: ClientConfig,
}

impl StudioClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check if the service is healthy.
    pub async fn health_check(&self) -> ClientResult<bool> {
        let url = self.config.health_url();

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let body: Value = match response.json().await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!("Studio API health check returned an unreadable body: {}", e);
                        return Ok(false);
                    }
                };
                let status = body.get("status").and_then(Value::as_str).unwrap_or_default();
                Ok(status == "healthy" || status == "ok")
            }
            Ok(response) => {
                warn!("Studio API health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Studio API health check error: {}", e);
                Ok(false)
            }
        }
    }

    async fn submit_once(&self, url: &str, request: &SubmitRequest) -> ClientResult<SubmitResponse> {
        let response = self.http.post(url).json(request).send().await?;
        let body = read_json(response).await?;
        Ok(SubmitResponse::from_payload(&body)?)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> ClientResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ClientResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "Studio API request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl JobApi for StudioClient {
    async fn submit(&self, request: &SubmitRequest) -> ClientResult<SubmitResponse> {
        let url = self.config.submit_url();
        debug!(subject_id = %request.subject_id, "Submitting job to {}", url);

        let response = self.with_retry(|| self.submit_once(&url, request)).await?;

        debug!(job_id = %response.job_id, status = %response.status, "Job accepted");
        Ok(response)
    }

    async fn poll_status(&self, job_id: &JobId) -> ClientResult<StatusSnapshot> {
        let url = self.config.status_url(job_id);

        let response = self.http.get(&url).send().await?;
        let body = read_json(response).await?;

        Ok(StatusSnapshot::from_payload(job_id.clone(), body)?)
    }
}

/// Delay before retry number `attempt + 1`: 500ms doubled per attempt.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(2u64.saturating_pow(attempt).saturating_mul(500))
}

/// Decode a response body, mapping non-2xx statuses to errors.
///
/// Any 4xx except 429 is a rejection, with the body's reason when it gives
/// one. Everything else keeps the status code so retry classification can
/// see it.
async fn read_json(response: Response) -> ClientResult<Value> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }

    if status.is_client_error() && status.as_u16() != 429 {
        let reason = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });
        return Err(ClientError::Rejected(
            reason.unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), text)),
        ));
    }

    Err(ClientError::Http {
        status: status.as_u16(),
        body: text,
    })
}
