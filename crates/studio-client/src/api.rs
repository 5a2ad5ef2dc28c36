//! The remote job API seam.

use async_trait::async_trait;
use studio_models::{JobId, StatusSnapshot, SubmitRequest, SubmitResponse};

use crate::error::ClientResult;

/// Remote service that runs long jobs.
///
/// The tracker only talks to this trait, so tests can drive it with a
/// scripted implementation.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Start a job. Failures here never reach the tracker.
    async fn submit(&self, request: &SubmitRequest) -> ClientResult<SubmitResponse>;

    /// Query the job once.
    async fn poll_status(&self, job_id: &JobId) -> ClientResult<StatusSnapshot>;
}
