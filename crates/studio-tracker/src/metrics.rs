//! Tracker metrics.
//!
//! Without an installed recorder every call here is a no-op.

use std::time::Duration;

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

pub mod names {
    /// Status queries by outcome (`processing`, `completed`, `failed`, `transient`).
    pub const POLLS_TOTAL: &str = "tracker_polls_total";

    /// Tracked jobs by final outcome.
    pub const JOBS_FINISHED_TOTAL: &str = "tracker_jobs_finished_total";

    /// Time from `start` to the terminal outcome.
    pub const JOB_DURATION_SECONDS: &str = "tracker_job_duration_seconds";
}

// =============================================================================
// Recording Functions
// =============================================================================

pub fn record_poll(outcome: &'static str) {
    counter!(names::POLLS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_finished(outcome: &'static str, elapsed: Duration) {
    counter!(names::JOBS_FINISHED_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, "outcome" => outcome).record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::POLLS_TOTAL.starts_with("tracker_"));
        assert!(names::JOBS_FINISHED_TOTAL.ends_with("_total"));
        assert!(names::JOB_DURATION_SECONDS.contains("seconds"));
    }

    #[test]
    fn test_recording_without_recorder() {
        record_poll("transient");
        record_finished("completed", Duration::from_millis(1500));
    }
}
