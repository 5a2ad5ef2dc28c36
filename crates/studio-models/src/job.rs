//! Remote job identity and the locally tracked job view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};
use crate::status::{StatusSnapshot, TIMEOUT_MESSAGE};

/// Opaque identifier assigned by the remote service on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Validate and wrap a job ID. Empty or whitespace-only IDs are rejected.
    pub fn parse(s: impl Into<String>) -> ModelResult<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(ModelError::EmptyJobId);
        }
        Ok(Self(s))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the resource being processed (uploaded image, story).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    /// Generate a new random subject ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is running on the remote side
    #[default]
    Processing,
    /// Job completed and produced a result
    Completed,
    /// Job failed (remote failure or local timeout)
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Last known state of one remote job.
///
/// Only poll observations move this view. Once it reaches a terminal
/// status it is frozen, and exactly one of `result` / `error_message`
/// is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,

    pub status: JobStatus,

    /// Progress (0-100), only meaningful while processing
    pub progress: u8,

    /// Reference to the produced artifact (completed only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Failure description (failed only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create the local view of a freshly submitted job.
    pub fn new(job_id: JobId, subject_id: Option<SubjectId>) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            subject_id,
            status: JobStatus::Processing,
            progress: 0,
            result: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fold one poll observation into the view.
    ///
    /// Returns `false` without touching anything when the job is already
    /// terminal.
    pub fn apply(&mut self, snapshot: &StatusSnapshot) -> bool {
        if self.is_terminal() {
            return false;
        }

        match snapshot.status {
            JobStatus::Processing => {
                self.progress = snapshot.progress;
            }
            JobStatus::Completed => {
                self.progress = snapshot.progress;
                self.result = snapshot.result.clone();
                self.error_message = None;
            }
            JobStatus::Failed => {
                self.result = None;
                self.error_message = snapshot.error_message.clone();
            }
        }
        self.status = snapshot.status;
        self.updated_at = Utc::now();
        true
    }

    /// Mark the view failed after the attempt budget ran out.
    pub fn time_out(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = JobStatus::Failed;
        self.result = None;
        self.error_message = Some(TIMEOUT_MESSAGE.to_string());
        self.updated_at = Utc::now();
        true
    }
}
