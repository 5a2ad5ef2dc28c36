//! Job submission request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::face_parsing::FaceParsingConfig;
use crate::job::{JobId, JobStatus, SubjectId};
use crate::status::RemoteStatus;

/// Request to start a remote job.
///
/// `config` is passed through untouched; only the remote service
/// interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(rename = "image_id")]
    pub subject_id: SubjectId,

    #[serde(rename = "original_image_url", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(rename = "face_parsing_config")]
    pub config: Value,
}

impl SubmitRequest {
    pub fn new(subject_id: SubjectId, source_url: Option<String>, config: Value) -> Self {
        Self {
            subject_id,
            source_url,
            config,
        }
    }

    /// Build a skin enhancement request.
    pub fn enhancement(
        subject_id: SubjectId,
        source_url: Option<String>,
        config: &FaceParsingConfig,
    ) -> Self {
        // FaceParsingConfig is plain bools, serialization cannot fail
        let config = serde_json::to_value(config).unwrap_or(Value::Null);
        Self::new(subject_id, source_url, config)
    }
}

/// Accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmitResponse {
    /// Interpret a submit response body.
    ///
    /// `success: false` or a missing job ID is a rejection.
    pub fn from_payload(raw: &Value) -> ModelResult<Self> {
        if raw.get("success").and_then(Value::as_bool) == Some(false) {
            let reason = raw
                .get("error")
                .or_else(|| raw.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("submission rejected");
            return Err(ModelError::rejected(reason));
        }

        let job_id = raw
            .get("job_id")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::rejected("response carried no job_id"))?;
        let job_id = JobId::parse(job_id)?;

        let status = match raw.get("status").and_then(Value::as_str) {
            Some(s) => RemoteStatus::parse(s)?.job_status(),
            None => JobStatus::Processing,
        };

        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            job_id,
            status,
            message,
        })
    }
}
