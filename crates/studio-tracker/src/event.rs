//! Stream form of tracker notifications.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::callbacks::Callbacks;
use crate::error::FailureKind;
use crate::handle::Shared;

/// One notification from a tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// Job still processing
    Progress { progress: u8, raw: Value },
    /// A status query failed; polling continues
    Transient { attempt: u32, message: String },
    Completed { result: String },
    Failed { kind: FailureKind, message: String },
}

impl JobEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Completed { .. } | JobEvent::Failed { .. })
    }
}

/// Finite stream of [`JobEvent`]s for one job.
///
/// Ends after the terminal event, or as soon as the handle is cancelled.
pub struct JobEvents {
    inner: BoxStream<'static, JobEvent>,
}

impl JobEvents {
    /// Callbacks that feed a new event stream.
    pub(crate) fn channel(shared: Arc<Shared>) -> (Callbacks, Self) {
        let (tx, rx) = mpsc::unbounded_channel();

        let progress_tx = tx.clone();
        let completed_tx = tx.clone();
        let failed_tx = tx.clone();
        let callbacks = Callbacks::new()
            .on_progress(move |progress, raw| {
                let _ = progress_tx.send(JobEvent::Progress {
                    progress,
                    raw: raw.clone(),
                });
            })
            .on_completed(move |result| {
                let _ = completed_tx.send(JobEvent::Completed {
                    result: result.to_string(),
                });
            })
            .on_failed(move |kind, message| {
                let _ = failed_tx.send(JobEvent::Failed {
                    kind,
                    message: message.to_string(),
                });
            })
            .on_diagnostic(move |attempt, error| {
                let _ = tx.send(JobEvent::Transient {
                    attempt,
                    message: error.to_string(),
                });
            });

        // The senders live in the poll task's callbacks, so the channel
        // closes when the task ends or is aborted.
        let inner = stream::unfold((rx, shared, false), |(mut rx, shared, done)| async move {
            if done || shared.was_cancelled() {
                return None;
            }
            let event = rx.recv().await?;
            if shared.was_cancelled() {
                return None;
            }
            let done = event.is_terminal();
            Some((event, (rx, shared, done)))
        })
        .boxed();

        (callbacks, Self { inner })
    }
}

impl Stream for JobEvents {
    type Item = JobEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<JobEvent>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for JobEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobEvents").finish_non_exhaustive()
    }
}
