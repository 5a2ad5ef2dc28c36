//! Studio command line client.

mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use studio_client::StudioClient;
use studio_models::{SubjectId, SubmitRequest};
use studio_tracker::{Callbacks, FailureKind, JobTracker, TrackOutcome, TrackingHandle};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::{load_face_config, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let client = Arc::new(StudioClient::new(cli.client_config()).context("Failed to build HTTP client")?);

    let code = match &cli.command {
        Command::Health => {
            let healthy = client.health_check().await?;
            println!("{}", if healthy { "healthy" } else { "unhealthy" });
            i32::from(!healthy)
        }
        Command::Enhance {
            image_id,
            image_url,
            config,
        } => {
            let face_config = load_face_config(config.as_deref())?;
            let subject = image_id
                .clone()
                .map(SubjectId::from_string)
                .unwrap_or_default();
            let request = SubmitRequest::enhancement(subject, image_url.clone(), &face_config);

            info!(regions = ?face_config.enabled_regions(), "Submitting enhancement");
            let tracker = JobTracker::new(client);
            let handle = tracker
                .submit_and_start(&request, cli.tracker_options(), printing_callbacks())
                .await?;
            println!("Submitted job {}", handle.job_id());
            run_to_end(handle).await
        }
        Command::Track { job_id } => {
            let tracker = JobTracker::new(client);
            let handle = tracker.start(job_id, cli.tracker_options(), printing_callbacks())?;
            run_to_end(handle).await
        }
    };

    std::process::exit(code);
}

fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))?
        .add_directive("studio_tracker=info".parse()?)
        .add_directive("studio_client=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

fn printing_callbacks() -> Callbacks {
    Callbacks::new().on_progress(|progress, _| println!("Progress: {progress}%"))
}

/// Wait for the job, cancelling on Ctrl-C. Returns the process exit code.
async fn run_to_end(handle: TrackingHandle) -> i32 {
    let outcome = tokio::select! {
        outcome = handle.wait() => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!(job_id = %handle.job_id(), "Interrupted, cancelling tracking");
            handle.cancel();
            TrackOutcome::Cancelled
        }
    };

    match outcome {
        TrackOutcome::Completed(result) => {
            println!("Completed: {result}");
            0
        }
        TrackOutcome::Failed { kind, message } => {
            eprintln!("{}", kind.user_message());
            if kind == FailureKind::Remote {
                eprintln!("Reason: {message}");
            }
            1
        }
        TrackOutcome::Cancelled => {
            eprintln!("Cancelled. Job {} may still be running remotely.", handle.job_id());
            130
        }
    }
}
