//! Command line arguments.
//!
//! Every global flag falls back to the same environment variable the
//! library configs read, so a `.env` file configures both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use studio_client::ClientConfig;
use studio_models::FaceParsingConfig;
use studio_tracker::TrackerOptions;

#[derive(Debug, Parser)]
#[command(name = "studio")]
#[command(about = "Submit and track studio enhancement jobs")]
#[command(version)]
pub struct Cli {
    /// Base URL of the studio API
    #[arg(long, global = true, default_value = "http://localhost:5001", env = "STUDIO_API_URL")]
    pub api_url: String,

    /// Delay between status queries in milliseconds
    #[arg(long, global = true, default_value_t = 5000, env = "TRACKER_POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    /// Status queries before giving up
    #[arg(long, global = true, default_value_t = 60, env = "TRACKER_MAX_ATTEMPTS")]
    pub max_attempts: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a skin enhancement job and track it
    Enhance {
        /// Uploaded image to enhance (random when omitted)
        #[arg(long)]
        image_id: Option<String>,

        /// URL of the original image
        #[arg(long)]
        image_url: Option<String>,

        /// JSON file with face parsing flags; missing flags keep their defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Track an already submitted job
    Track {
        job_id: String,
    },

    /// Check that the studio API is up
    Health,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::from_env().with_base_url(self.api_url.clone())
    }

    pub fn tracker_options(&self) -> TrackerOptions {
        TrackerOptions::new()
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_max_attempts(self.max_attempts)
    }
}

/// Read face parsing flags, or the defaults when no file is given.
pub fn load_face_config(path: Option<&Path>) -> anyhow::Result<FaceParsingConfig> {
    let Some(path) = path else {
        return Ok(FaceParsingConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid face parsing config in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_enhance() {
        let cli = Cli::try_parse_from([
            "studio",
            "--poll-interval-ms",
            "250",
            "enhance",
            "--image-id",
            "img-7",
            "--max-attempts",
            "0",
        ])
        .unwrap();

        let options = cli.tracker_options();
        assert_eq!(options.poll_interval, Duration::from_millis(250));
        assert_eq!(options.max_attempts, 1);
        assert!(matches!(
            cli.command,
            Command::Enhance { ref image_id, .. } if image_id.as_deref() == Some("img-7")
        ));
    }

    #[test]
    fn test_parse_track_requires_job_id() {
        assert!(Cli::try_parse_from(["studio", "track"]).is_err());
        let cli = Cli::try_parse_from(["studio", "track", "job-42"]).unwrap();
        assert!(matches!(cli.command, Command::Track { ref job_id } if job_id == "job-42"));
    }

    #[test]
    fn test_load_face_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hair": false, "neck": true}}"#).unwrap();

        let config = load_face_config(Some(file.path())).unwrap();
        assert!(!config.hair);
        assert!(config.neck);
        assert!(config.skin);
    }

    #[test]
    fn test_load_face_config_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_face_config(Some(file.path())).is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(load_face_config(Some(&dir.path().join("missing.json"))).is_err());

        assert_eq!(load_face_config(None).unwrap(), FaceParsingConfig::default());
    }
}
