//! Status observations returned by the remote job API.
//!
//! A poll response is reduced to a [`StatusSnapshot`] here, so every layer
//! above sees the same three-state vocabulary regardless of whether the
//! service answered with its own statuses or with the provider's.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::job::{JobId, JobStatus};

/// Message used when the remote side reports failure without a reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "The enhancement process failed.";

/// Message recorded when the attempt budget runs out while still processing.
pub const TIMEOUT_MESSAGE: &str =
    "The job is taking longer than expected. It may still finish, please check back later.";

/// Fields that may carry the result reference of a completed job.
const RESULT_KEYS: &[&str] = &["result", "enhanced_image_url", "enhanced_url", "output_url"];

/// Status strings the remote side may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Processing,
    Completed,
    Failed,
    InQueue,
    InProgress,
    ProviderCompleted,
    ProviderFailed,
    Cancelled,
    TimedOut,
}

impl RemoteStatus {
    /// Parse a status string in either vocabulary.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "processing" => Ok(Self::Processing),
            "completed" | "complete" => Ok(Self::Completed),
            "failed" | "error" => Ok(Self::Failed),
            "IN_QUEUE" => Ok(Self::InQueue),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::ProviderCompleted),
            "FAILED" => Ok(Self::ProviderFailed),
            "CANCELLED" => Ok(Self::Cancelled),
            "TIMED_OUT" => Ok(Self::TimedOut),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }

    /// Map onto the tracked status.
    pub fn job_status(&self) -> JobStatus {
        match self {
            Self::Processing | Self::InQueue | Self::InProgress => JobStatus::Processing,
            Self::Completed | Self::ProviderCompleted => JobStatus::Completed,
            Self::Failed | Self::ProviderFailed | Self::Cancelled | Self::TimedOut => {
                JobStatus::Failed
            }
        }
    }

    /// Progress estimate for provider statuses that carry no percentage.
    fn estimated_progress(&self) -> u8 {
        match self {
            Self::InQueue => 10,
            Self::InProgress => 50,
            Self::ProviderCompleted => 100,
            _ => 0,
        }
    }
}

/// One observation of a remote job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// The response body as received
    pub raw: Value,
}

impl StatusSnapshot {
    /// Build a snapshot from a decoded poll response body.
    ///
    /// Payloads that cannot be trusted (explicit `success: false`, unknown
    /// status, `completed` without a result) are rejected so the caller can
    /// treat them as transient.
    pub fn from_payload(job_id: JobId, raw: Value) -> ModelResult<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| ModelError::malformed("response body is not a JSON object"))?;

        if obj.get("success").and_then(Value::as_bool) == Some(false) {
            let reason = string_field(&raw, &["error", "message"])
                .unwrap_or_else(|| "success=false".to_string());
            return Err(ModelError::malformed(reason));
        }

        let status_str = obj
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::malformed("missing status"))?;
        let remote = RemoteStatus::parse(status_str)?;
        let status = remote.job_status();

        let progress = obj
            .get("progress")
            .and_then(parse_progress)
            .unwrap_or_else(|| remote.estimated_progress());

        let (result, error_message) = match status {
            JobStatus::Processing => (None, None),
            JobStatus::Completed => {
                let result = string_field(&raw, RESULT_KEYS)
                    .or_else(|| obj.get("output").and_then(output_reference))
                    .ok_or_else(|| ModelError::malformed("completed without a result reference"))?;
                (Some(result), None)
            }
            JobStatus::Failed => {
                let message = string_field(&raw, &["error_message", "error"])
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                (None, Some(message))
            }
        };

        Ok(Self {
            job_id,
            status,
            progress,
            result,
            error_message,
            raw,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// First non-empty string among `keys`.
fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| raw.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_progress(v: &Value) -> Option<u8> {
    let n = v.as_f64()?;
    Some(n.clamp(0.0, 100.0) as u8)
}

/// Pull an artifact reference out of a provider `output` field, which may
/// be a string, a list of strings, or an object.
fn output_reference(output: &Value) -> Option<String> {
    match output {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.first().and_then(output_reference),
        Value::Object(_) => string_field(output, &["image_url", "enhanced_image", "video_url"]),
        _ => None,
    }
}
