//! Model error types.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Job ID must not be empty")]
    EmptyJobId,

    #[error("Malformed status payload: {0}")]
    MalformedStatus(String),

    #[error("Unknown remote status: {0}")]
    UnknownStatus(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl ModelError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedStatus(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}
