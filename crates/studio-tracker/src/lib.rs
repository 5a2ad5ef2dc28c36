//! Tracking of long-running remote jobs.
//!
//! A [`JobTracker`] polls one submitted job until the remote side reports
//! it completed or failed, or until the attempt budget runs out, and
//! reports through [`Callbacks`] or a [`JobEvents`] stream. Each started
//! job is owned by its [`TrackingHandle`]; cancelling or dropping the
//! handle stops polling and silences every callback.
//!
//! ```no_run
//! # async fn demo(api: std::sync::Arc<dyn studio_client::JobApi>) -> studio_tracker::TrackerResult<()> {
//! use studio_tracker::{Callbacks, JobTracker, TrackerOptions};
//!
//! let tracker = JobTracker::new(api);
//! let handle = tracker.start(
//!     "job-42",
//!     TrackerOptions::default(),
//!     Callbacks::new()
//!         .on_progress(|p, _| println!("{p}%"))
//!         .on_completed(|url| println!("done: {url}")),
//! )?;
//! let outcome = handle.wait().await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod callbacks;
pub mod error;
pub mod event;
pub mod handle;
pub mod logging;
pub mod metrics;
pub mod options;
pub mod tracker;

pub use callbacks::Callbacks;
pub use error::{FailureKind, TrackerError, TrackerResult};
pub use event::{JobEvent, JobEvents};
pub use handle::{TrackOutcome, TrackingHandle};
pub use options::TrackerOptions;
pub use tracker::JobTracker;
