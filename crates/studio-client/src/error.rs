//! Client error types.

use studio_models::ModelError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Network faults, 5xx and 429 are worth another try. Rejections never are.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<ModelError> for ClientError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Rejected(msg) => ClientError::Rejected(msg),
            other => ClientError::InvalidResponse(other.to_string()),
        }
    }
}
