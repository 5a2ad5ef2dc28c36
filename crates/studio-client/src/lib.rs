//! Client for the studio job API.
//!
//! The API runs long jobs (skin enhancement, video generation) and exposes
//! two operations: submit a job and query its status. [`JobApi`] is the
//! trait the tracker consumes, [`StudioClient`] its HTTP implementation.

pub mod api;
pub mod client;
pub mod config;
pub mod error;

pub use api::JobApi;
pub use client::StudioClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
