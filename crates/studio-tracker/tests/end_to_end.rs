//! Submit and track a job through the HTTP client against a mock studio API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use studio_client::{ClientConfig, StudioClient};
use studio_models::{FaceParsingConfig, SubjectId, SubmitRequest};
use studio_tracker::{Callbacks, FailureKind, JobTracker, TrackOutcome, TrackerOptions};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tracker_for(server: &MockServer) -> JobTracker {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_max_retries(0);
    JobTracker::new(Arc::new(StudioClient::new(config).unwrap()))
}

fn options() -> TrackerOptions {
    TrackerOptions::new()
        .with_poll_interval(Duration::from_millis(20))
        .with_max_attempts(10)
}

async fn mount_status(server: &MockServer, body: serde_json::Value, times: u64) {
    Mock::given(method("GET"))
        .and(path("/skin-studio/enhance/status/job-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_enhancement_job_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/skin-studio/enhance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "job_id": "job-42",
            "status": "processing"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_status(&server, json!({"success": true, "status": "processing", "progress": 10}), 1).await;
    Mock::given(method("GET"))
        .and(path("/skin-studio/enhance/status/job-42"))
        .respond_with(ResponseTemplate::new(500).set_body_string("flaky"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, json!({"success": true, "status": "processing", "progress": 55}), 1).await;
    mount_status(
        &server,
        json!({
            "success": true,
            "status": "completed",
            "progress": 100,
            "enhanced_image_url": "https://x/out.png"
        }),
        1,
    )
    .await;

    let tracker = tracker_for(&server);
    let progress = Arc::new(Mutex::new(Vec::new()));
    let diagnostics = Arc::new(Mutex::new(0u32));
    let callbacks = {
        let progress = progress.clone();
        let diagnostics = diagnostics.clone();
        Callbacks::new()
            .on_progress(move |p, _| progress.lock().unwrap().push(p))
            .on_diagnostic(move |_, _| *diagnostics.lock().unwrap() += 1)
    };

    let request = SubmitRequest::enhancement(
        SubjectId::from_string("img-7"),
        None,
        &FaceParsingConfig::default(),
    );
    let handle = tracker
        .submit_and_start(&request, options(), callbacks)
        .await
        .unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .unwrap();

    assert_eq!(outcome, TrackOutcome::Completed("https://x/out.png".into()));
    assert_eq!(*progress.lock().unwrap(), vec![10, 55]);
    assert_eq!(*diagnostics.lock().unwrap(), 1);

    let polls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(polls, 4);
}

#[tokio::test]
async fn test_remote_failure_end_to_end() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        json!({"success": true, "status": "FAILED", "error": "GPU out of memory"}),
        1,
    )
    .await;

    let tracker = tracker_for(&server);
    let handle = tracker.start("job-42", options(), Callbacks::new()).unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TrackOutcome::Failed {
            kind: FailureKind::Remote,
            message: "GPU out of memory".into()
        }
    );
}
