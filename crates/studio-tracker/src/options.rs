//! Tracking options.

use std::time::Duration;

use studio_models::SubjectId;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// How a job is polled.
///
/// The defaults poll every 5 seconds for at most 60 attempts, which bounds
/// the total wait to about five minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerOptions {
    /// Delay between the end of one status query and the next
    pub poll_interval: Duration,
    /// Total status queries allowed, transient failures included
    pub max_attempts: u32,
    /// Resource the job processes, recorded on the local job view
    pub subject_id: Option<SubjectId>,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            subject_id: None,
        }
    }
}

impl TrackerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from environment variables.
    pub fn from_env() -> Self {
        let poll_interval = std::env::var("TRACKER_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        let max_attempts = std::env::var("TRACKER_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        Self::default()
            .with_poll_interval(poll_interval)
            .with_max_attempts(max_attempts)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Zero is treated as one: the first query always goes out.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_subject(mut self, subject_id: SubjectId) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    /// Attempt budget as used by the poll loop.
    pub(crate) fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}
