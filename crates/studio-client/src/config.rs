//! Client configuration.

use std::time::Duration;

use studio_models::JobId;

/// Configuration for the studio API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the studio API
    pub base_url: String,
    /// Submission endpoint path
    pub submit_path: String,
    /// Status endpoint path; `{job_id}` is substituted
    pub status_path: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries for submission
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            submit_path: "/skin-studio/enhance".to_string(),
            status_path: "/skin-studio/enhance/status/{job_id}".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("STUDIO_API_URL").unwrap_or(defaults.base_url),
            submit_path: std::env::var("STUDIO_SUBMIT_PATH").unwrap_or(defaults.submit_path),
            status_path: std::env::var("STUDIO_STATUS_PATH").unwrap_or(defaults.status_path),
            timeout: std::env::var("STUDIO_API_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var("STUDIO_API_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn submit_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.submit_path)
    }

    pub fn status_url(&self, job_id: &JobId) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.status_path.replace("{job_id}", job_id.as_str())
        )
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url.trim_end_matches('/'))
    }
}
