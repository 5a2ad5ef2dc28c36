//! Caller notifications.

use std::fmt;

use serde_json::Value;
use studio_client::ClientError;

use crate::error::FailureKind;

type ProgressFn = Box<dyn FnMut(u8, &Value) + Send>;
type CompletedFn = Box<dyn FnMut(&str) + Send>;
type FailedFn = Box<dyn FnMut(FailureKind, &str) + Send>;
type DiagnosticFn = Box<dyn FnMut(u32, &ClientError) + Send>;

/// Callbacks fired by a tracker.
///
/// All are optional. `on_progress` and `on_diagnostic` may fire any number
/// of times; at most one of `on_completed` / `on_failed` fires, and nothing
/// fires once the handle is cancelled.
#[derive(Default)]
pub struct Callbacks {
    on_progress: Option<ProgressFn>,
    on_completed: Option<CompletedFn>,
    on_failed: Option<FailedFn>,
    on_diagnostic: Option<DiagnosticFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote progress (0-100) and the raw status payload.
    pub fn on_progress(mut self, f: impl FnMut(u8, &Value) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Result reference of a completed job.
    pub fn on_completed(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_completed = Some(Box::new(f));
        self
    }

    pub fn on_failed(mut self, f: impl FnMut(FailureKind, &str) + Send + 'static) -> Self {
        self.on_failed = Some(Box::new(f));
        self
    }

    /// A status query failed; polling continues.
    pub fn on_diagnostic(mut self, f: impl FnMut(u32, &ClientError) + Send + 'static) -> Self {
        self.on_diagnostic = Some(Box::new(f));
        self
    }

    pub(crate) fn progress(&mut self, progress: u8, raw: &Value) {
        if let Some(f) = self.on_progress.as_mut() {
            f(progress, raw);
        }
    }

    pub(crate) fn completed(&mut self, result: &str) {
        if let Some(f) = self.on_completed.as_mut() {
            f(result);
        }
    }

    pub(crate) fn failed(&mut self, kind: FailureKind, message: &str) {
        if let Some(f) = self.on_failed.as_mut() {
            f(kind, message);
        }
    }

    pub(crate) fn diagnostic(&mut self, attempt: u32, error: &ClientError) {
        if let Some(f) = self.on_diagnostic.as_mut() {
            f(attempt, error);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_completed", &self.on_completed.is_some())
            .field("on_failed", &self.on_failed.is_some())
            .field("on_diagnostic", &self.on_diagnostic.is_some())
            .finish()
    }
}
