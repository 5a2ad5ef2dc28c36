//! Caller-side handle and the state it shares with the poll task.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use studio_models::{Job, JobId};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::FailureKind;

thread_local! {
    /// Tracker whose callback is running on this thread, if any.
    static DISPATCHING: Cell<Option<usize>> = const { Cell::new(None) };
}

/// How tracking ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// The job completed; carries the result reference
    Completed(String),
    /// The job failed remotely or timed out
    Failed { kind: FailureKind, message: String },
    /// The handle was cancelled before a terminal status was seen
    Cancelled,
}

impl TrackOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TrackOutcome::Completed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            TrackOutcome::Completed(_) => "completed",
            TrackOutcome::Failed { kind: FailureKind::Remote, .. } => "failed",
            TrackOutcome::Failed { kind: FailureKind::Timeout, .. } => "timeout",
            TrackOutcome::Cancelled => "cancelled",
        }
    }
}

/// State shared between one handle and its poll task.
///
/// Every callback runs under `dispatch`, after checking `cancelled`. Cancel
/// sets the flag and then waits on the same lock, so once it returns no
/// callback is running and none can start.
pub(crate) struct Shared {
    cancelled: AtomicBool,
    dispatch: Mutex<()>,
    job: Mutex<Job>,
    outcome: watch::Sender<Option<TrackOutcome>>,
}

impl Shared {
    pub(crate) fn new(job: Job) -> Arc<Self> {
        let (outcome, _) = watch::channel(None);
        Arc::new(Self {
            cancelled: AtomicBool::new(false),
            dispatch: Mutex::new(()),
            job: Mutex::new(job),
            outcome,
        })
    }

    fn id(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether tracking ended by cancellation rather than a terminal status.
    pub(crate) fn was_cancelled(&self) -> bool {
        matches!(*self.outcome.borrow(), Some(TrackOutcome::Cancelled))
    }

    /// Apply a change to the local job view.
    pub(crate) fn update_job<R>(&self, f: impl FnOnce(&mut Job) -> R) -> R {
        f(&mut lock(&self.job))
    }

    pub(crate) fn job(&self) -> Job {
        lock(&self.job).clone()
    }

    /// Record the outcome unless one is already set.
    fn finish(&self, outcome: TrackOutcome) -> bool {
        self.outcome.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(outcome);
            true
        })
    }

    pub(crate) fn outcome(&self) -> Option<TrackOutcome> {
        self.outcome.borrow().clone()
    }

    /// Run a non-terminal callback unless cancelled. Returns whether it ran.
    pub(crate) fn dispatch(self: &Arc<Self>, f: impl FnOnce()) -> bool {
        let _guard = lock(&self.dispatch);
        if self.is_cancelled() {
            return false;
        }
        let _marker = DispatchMarker::enter(self.id());
        f();
        true
    }

    /// Record a terminal outcome and run its callback, unless cancelled.
    ///
    /// Both happen under the dispatch lock, so a concurrent cancel either
    /// wins entirely or finds the outcome already recorded.
    pub(crate) fn dispatch_terminal(
        self: &Arc<Self>,
        outcome: TrackOutcome,
        f: impl FnOnce(),
    ) -> bool {
        let _guard = lock(&self.dispatch);
        if self.is_cancelled() {
            return false;
        }
        let label = outcome.label();
        if !self.finish(outcome) {
            return false;
        }
        tracing::trace!(outcome = label, "Dispatching terminal callback");
        let _marker = DispatchMarker::enter(self.id());
        f();
        true
    }
}

/// Clears the thread-local dispatch marker on drop, including on panic.
struct DispatchMarker {
    previous: Option<usize>,
}

impl DispatchMarker {
    fn enter(id: usize) -> Self {
        let previous = DISPATCHING.with(|d| d.replace(Some(id)));
        Self { previous }
    }
}

impl Drop for DispatchMarker {
    fn drop(&mut self) {
        DISPATCHING.with(|d| d.set(self.previous));
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking callback poisons the lock; the guarded data stays valid.
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to one tracked job.
///
/// Tracking lives as long as the handle: dropping it cancels.
pub struct TrackingHandle {
    job_id: JobId,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl TrackingHandle {
    pub(crate) fn new(job_id: JobId, shared: Arc<Shared>, task: JoinHandle<()>) -> Self {
        Self {
            job_id,
            shared,
            task,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Stop tracking.
    ///
    /// Idempotent, and a no-op after the job reached a terminal state. When
    /// this returns no callback is running and none will fire again, except
    /// when called from inside one of this tracker's own callbacks: then the
    /// current callback finishes and nothing fires after it.
    pub fn cancel(&self) {
        if self.shared.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        let in_own_callback = DISPATCHING.with(|d| d.get() == Some(self.shared.id()));
        if !in_own_callback {
            drop(lock(&self.shared.dispatch));
        }

        self.task.abort();
        self.shared.finish(TrackOutcome::Cancelled);
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.was_cancelled()
    }

    /// Whether tracking has ended, by any outcome.
    pub fn is_finished(&self) -> bool {
        self.shared.outcome().is_some()
    }

    /// Latest local view of the job.
    pub fn job(&self) -> Job {
        self.shared.job()
    }

    /// Outcome, if tracking has ended.
    pub fn outcome(&self) -> Option<TrackOutcome> {
        self.shared.outcome()
    }

    /// Wait until tracking ends.
    pub async fn wait(&self) -> TrackOutcome {
        let mut rx = self.shared.outcome.subscribe();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or(TrackOutcome::Cancelled)
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for TrackingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingHandle")
            .field("job_id", &self.job_id)
            .field("outcome", &self.shared.outcome())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> Arc<Shared> {
        Shared::new(Job::new(JobId::parse("job-1").unwrap(), None))
    }

    #[test]
    fn test_dispatch_blocked_after_cancel() {
        let shared = shared();
        let mut calls = 0;

        assert!(shared.dispatch(|| calls += 1));
        shared.cancelled.store(true, Ordering::SeqCst);
        assert!(!shared.dispatch(|| calls += 1));
        assert!(!shared.dispatch_terminal(TrackOutcome::Completed("x".into()), || calls += 1));

        assert_eq!(calls, 1);
        assert!(shared.outcome().is_none());
    }

    #[test]
    fn test_single_terminal_outcome() {
        let shared = shared();
        let mut calls = 0;

        assert!(shared.dispatch_terminal(TrackOutcome::Completed("a".into()), || calls += 1));
        assert!(!shared.dispatch_terminal(
            TrackOutcome::Failed {
                kind: FailureKind::Remote,
                message: "late".into()
            },
            || calls += 1
        ));

        assert_eq!(calls, 1);
        assert_eq!(shared.outcome(), Some(TrackOutcome::Completed("a".into())));
    }

    #[test]
    fn test_dispatch_marker_resets() {
        let shared = shared();
        let id = shared.id();
        shared.dispatch(|| {
            assert_eq!(DISPATCHING.with(|d| d.get()), Some(id));
        });
        assert_eq!(DISPATCHING.with(|d| d.get()), None);
    }
}
