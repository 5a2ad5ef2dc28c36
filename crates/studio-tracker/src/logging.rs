//! Structured logging for tracked jobs.

use tracing::{debug, error, info, warn, Span};
use studio_models::JobId;

/// Job logger for structured logging with consistent formatting.
///
/// Every line carries the job ID and the tracking operation, so a single
/// job can be followed through interleaved output of many trackers.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: String,
}

impl JobLogger {
    /// Create a new job logger for a specific job and operation.
    pub fn new(job_id: &JobId, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, poll_interval_ms: u64, max_attempts: u32) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            poll_interval_ms,
            max_attempts,
            "Tracking started"
        );
    }

    pub fn log_progress(&self, attempt: u32, progress: u8) {
        debug!(
            job_id = %self.job_id,
            operation = %self.operation,
            attempt,
            progress,
            "Job progress"
        );
    }

    pub fn log_transient(&self, attempt: u32, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            attempt,
            "Status query failed, will retry: {}", message
        );
    }

    pub fn log_failed(&self, attempt: u32, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            attempt,
            "Job failed: {}", message
        );
    }

    pub fn log_timeout(&self, attempts: u32) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            attempts,
            "Job still processing after attempt budget, giving up"
        );
    }

    pub fn log_completion(&self, attempt: u32, result: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            attempt,
            result,
            "Job completed"
        );
    }

    pub fn log_cancelled(&self) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Tracking cancelled"
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "track_job",
            job_id = %self.job_id,
            operation = %self.operation
        )
    }
}

/// Tracks consecutive status-query failures to avoid log spam.
///
/// A backend outage makes every poll fail; after `max_logged_failures`
/// warnings the rest are suppressed until a poll succeeds again.
#[derive(Debug)]
pub struct FailureTracker {
    consecutive_failures: u32,
    max_logged_failures: u32,
    suppressed: bool,
}

impl FailureTracker {
    pub fn new(max_logged_failures: u32) -> Self {
        Self {
            consecutive_failures: 0,
            max_logged_failures,
            suppressed: false,
        }
    }

    /// Record a successful poll (resets failure count).
    pub fn record_success(&mut self, logger: &JobLogger) {
        if self.consecutive_failures > 0 && self.suppressed {
            info!(
                job_id = %logger.job_id(),
                "Status queries recovered after {} consecutive failures",
                self.consecutive_failures
            );
        }
        self.consecutive_failures = 0;
        self.suppressed = false;
    }

    /// Record a failed poll.
    ///
    /// Returns `true` if this failure should be logged.
    pub fn record_failure(&mut self, logger: &JobLogger) -> bool {
        self.consecutive_failures += 1;

        if self.consecutive_failures <= self.max_logged_failures {
            true
        } else {
            if !self.suppressed {
                self.suppressed = true;
                warn!(
                    job_id = %logger.job_id(),
                    "Suppressing further status query warnings after {} consecutive failures",
                    self.max_logged_failures
                );
            }
            false
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.consecutive_failures
    }
}
