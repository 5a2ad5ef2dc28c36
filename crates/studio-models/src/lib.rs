//! Shared data models for the studio backend.
//!
//! This crate provides Serde-serializable types for:
//! - Remote jobs and their locally tracked view
//! - Status observations returned by the job API
//! - Submission requests and responses
//! - Face parsing configuration for skin enhancement

pub mod error;
pub mod face_parsing;
pub mod job;
pub mod status;
pub mod submit;

// Re-export common types
pub use error::{ModelError, ModelResult};
pub use face_parsing::FaceParsingConfig;
pub use job::{Job, JobId, JobStatus, SubjectId};
pub use status::{RemoteStatus, StatusSnapshot, DEFAULT_FAILURE_MESSAGE, TIMEOUT_MESSAGE};
pub use submit::{SubmitRequest, SubmitResponse};
