//! Job tracker: submission and the per-job poll loop.

use std::sync::Arc;

use studio_client::JobApi;
use studio_models::{Job, JobId, JobStatus, SubmitRequest, DEFAULT_FAILURE_MESSAGE, TIMEOUT_MESSAGE};
use tokio::time::Instant;
use tracing::{info, Instrument};

use crate::callbacks::Callbacks;
use crate::error::{FailureKind, TrackerError, TrackerResult};
use crate::event::JobEvents;
use crate::handle::{Shared, TrackOutcome, TrackingHandle};
use crate::logging::{FailureTracker, JobLogger};
use crate::metrics;
use crate::options::TrackerOptions;

/// Consecutive failed queries logged before warnings are suppressed.
const MAX_LOGGED_POLL_FAILURES: u32 = 3;

/// Starts and tracks remote jobs.
///
/// Cheap to clone. Each `start` spawns an independent poll task owned by the
/// returned handle; trackers share nothing but the API client.
#[derive(Clone)]
pub struct JobTracker {
    api: Arc<dyn JobApi>,
}

impl JobTracker {
    pub fn new(api: Arc<dyn JobApi>) -> Self {
        Self { api }
    }

    /// Submit a job. Failures are returned here and never reach a tracker.
    pub async fn submit(&self, request: &SubmitRequest) -> TrackerResult<JobId> {
        let response = self
            .api
            .submit(request)
            .await
            .map_err(TrackerError::Submission)?;

        info!(
            job_id = %response.job_id,
            subject_id = %request.subject_id,
            status = %response.status,
            "Job submitted"
        );
        Ok(response.job_id)
    }

    /// Submit a job and start tracking it.
    pub async fn submit_and_start(
        &self,
        request: &SubmitRequest,
        options: TrackerOptions,
        callbacks: Callbacks,
    ) -> TrackerResult<TrackingHandle> {
        let job_id = self.submit(request).await?;
        let options = match options.subject_id {
            Some(_) => options,
            None => options.with_subject(request.subject_id.clone()),
        };
        self.start(job_id.as_str(), options, callbacks)
    }

    /// Start tracking a submitted job.
    ///
    /// The first status query goes out immediately, then one every
    /// `poll_interval` until a terminal status, the attempt budget runs out,
    /// or the handle is cancelled. Must be called within a Tokio runtime.
    pub fn start(
        &self,
        job_id: &str,
        options: TrackerOptions,
        callbacks: Callbacks,
    ) -> TrackerResult<TrackingHandle> {
        let job_id = JobId::parse(job_id)?;
        let shared = Shared::new(Job::new(job_id.clone(), options.subject_id.clone()));
        Ok(self.spawn(job_id, options, callbacks, shared))
    }

    /// Start tracking and receive notifications as a stream.
    ///
    /// The stream ends after the terminal event or when the handle is
    /// cancelled. Dropping the handle cancels.
    pub fn watch(
        &self,
        job_id: &str,
        options: TrackerOptions,
    ) -> TrackerResult<(TrackingHandle, JobEvents)> {
        let job_id = JobId::parse(job_id)?;
        let shared = Shared::new(Job::new(job_id.clone(), options.subject_id.clone()));
        let (callbacks, events) = JobEvents::channel(shared.clone());
        let handle = self.spawn(job_id, options, callbacks, shared);
        Ok((handle, events))
    }

    fn spawn(
        &self,
        job_id: JobId,
        options: TrackerOptions,
        callbacks: Callbacks,
        shared: Arc<Shared>,
    ) -> TrackingHandle {
        let logger = JobLogger::new(&job_id, "track_job");
        let span = logger.create_span();
        let poll = PollLoop {
            api: self.api.clone(),
            shared: shared.clone(),
            job_id: job_id.clone(),
            options,
            callbacks,
            logger,
        };
        let task = tokio::spawn(poll.run().instrument(span));
        TrackingHandle::new(job_id, shared, task)
    }
}

/// State owned by one poll task.
struct PollLoop {
    api: Arc<dyn JobApi>,
    shared: Arc<Shared>,
    job_id: JobId,
    options: TrackerOptions,
    callbacks: Callbacks,
    logger: JobLogger,
}

impl PollLoop {
    async fn run(mut self) {
        let started = Instant::now();
        let budget = self.options.attempt_budget();
        let mut failures = FailureTracker::new(MAX_LOGGED_POLL_FAILURES);

        let interval_ms = u64::try_from(self.options.poll_interval.as_millis()).unwrap_or(u64::MAX);
        self.logger.log_start(interval_ms, budget);

        for attempt in 1..=budget {
            if self.shared.is_cancelled() {
                return;
            }

            let polled = self.api.poll_status(&self.job_id).await;
            if self.shared.is_cancelled() {
                return;
            }

            match polled {
                Ok(snapshot) => {
                    failures.record_success(&self.logger);
                    metrics::record_poll(snapshot.status.as_str());
                    self.shared.update_job(|job| job.apply(&snapshot));

                    match snapshot.status {
                        JobStatus::Processing => {
                            self.logger.log_progress(attempt, snapshot.progress);
                            let callbacks = &mut self.callbacks;
                            self.shared
                                .dispatch(|| callbacks.progress(snapshot.progress, &snapshot.raw));
                        }
                        JobStatus::Completed => {
                            let result = snapshot.result.unwrap_or_default();
                            self.logger.log_completion(attempt, &result);
                            let callbacks = &mut self.callbacks;
                            let outcome = TrackOutcome::Completed(result.clone());
                            if self
                                .shared
                                .dispatch_terminal(outcome, || callbacks.completed(&result))
                            {
                                metrics::record_finished("completed", started.elapsed());
                            }
                            return;
                        }
                        JobStatus::Failed => {
                            let message = snapshot
                                .error_message
                                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                            self.logger.log_failed(attempt, &message);
                            self.finish_failed(FailureKind::Remote, message, started);
                            return;
                        }
                    }
                }
                Err(error) => {
                    metrics::record_poll("transient");
                    if failures.record_failure(&self.logger) {
                        self.logger.log_transient(attempt, &error.to_string());
                    }
                    let callbacks = &mut self.callbacks;
                    self.shared.dispatch(|| callbacks.diagnostic(attempt, &error));
                }
            }

            if attempt < budget {
                tokio::time::sleep(self.options.poll_interval).await;
            }
        }

        if self.shared.is_cancelled() {
            return;
        }
        self.shared.update_job(Job::time_out);
        self.logger.log_timeout(budget);
        self.finish_failed(FailureKind::Timeout, TIMEOUT_MESSAGE.to_string(), started);
    }

    fn finish_failed(&mut self, kind: FailureKind, message: String, started: Instant) {
        let callbacks = &mut self.callbacks;
        let outcome = TrackOutcome::Failed {
            kind,
            message: message.clone(),
        };
        if self
            .shared
            .dispatch_terminal(outcome, || callbacks.failed(kind, &message))
        {
            let label = match kind {
                FailureKind::Remote => "failed",
                FailureKind::Timeout => "timeout",
            };
            metrics::record_finished(label, started.elapsed());
        }
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        if self.shared.was_cancelled() {
            self.logger.log_cancelled();
        }
    }
}
