//! Tracker error types.

use std::fmt;

use studio_client::ClientError;
use studio_models::{ModelError, TIMEOUT_MESSAGE};
use thiserror::Error;

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Which kind of terminal failure a job ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The remote service reported the job failed
    Remote,
    /// The attempt budget ran out while the job was still processing
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Remote => "remote_failure",
            FailureKind::Timeout => "timeout",
        }
    }

    /// Copy suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::Remote => "The job failed. Please try again.",
            FailureKind::Timeout => TIMEOUT_MESSAGE,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid job ID: {0}")]
    InvalidJobId(#[from] ModelError),

    #[error("Submission failed: {0}")]
    Submission(#[source] ClientError),

    #[error("Status query {attempt} failed: {source}")]
    TransientPoll {
        attempt: u32,
        #[source]
        source: ClientError,
    },

    #[error("Job failed: {0}")]
    RemoteFailure(String),

    #[error("Job still processing after {attempts} attempts")]
    Timeout { attempts: u32 },
}

impl TrackerError {
    /// Terminal failure kind, if this error ends a job.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            TrackerError::RemoteFailure(_) => Some(FailureKind::Remote),
            TrackerError::Timeout { .. } => Some(FailureKind::Timeout),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, TrackerError::TransientPoll { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind() {
        assert_eq!(
            TrackerError::RemoteFailure("model crashed".into()).failure_kind(),
            Some(FailureKind::Remote)
        );
        assert_eq!(
            TrackerError::Timeout { attempts: 5 }.failure_kind(),
            Some(FailureKind::Timeout)
        );
        assert_eq!(
            TrackerError::Submission(ClientError::rejected("no")).failure_kind(),
            None
        );
    }

    #[test]
    fn test_transient() {
        let err = TrackerError::TransientPoll {
            attempt: 2,
            source: ClientError::invalid_response("missing status"),
        };
        assert!(err.is_transient());
        assert!(err.to_string().contains("Status query 2"));
    }

    #[test]
    fn test_user_messages_differ() {
        assert_ne!(
            FailureKind::Remote.user_message(),
            FailureKind::Timeout.user_message()
        );
        assert!(FailureKind::Timeout.user_message().contains("check back later"));
    }
}
