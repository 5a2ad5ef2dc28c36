//! StudioClient against a mock studio API.

use std::time::Duration;

use serde_json::json;
use studio_client::{ClientConfig, ClientError, JobApi, StudioClient};
use studio_models::{FaceParsingConfig, JobId, JobStatus, SubjectId, SubmitRequest};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, max_retries: u32) -> StudioClient {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_max_retries(max_retries);
    StudioClient::new(config).unwrap()
}

fn request() -> SubmitRequest {
    SubmitRequest::enhancement(
        SubjectId::from_string("img-7"),
        Some("https://x/in.png".into()),
        &FaceParsingConfig::default(),
    )
}

#[tokio::test]
async fn test_submit_returns_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/skin-studio/enhance"))
        .and(body_partial_json(json!({
            "image_id": "img-7",
            "face_parsing_config": {"skin": true, "background": false}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "job_id": "job-42",
            "status": "processing",
            "message": "Enhancement job started"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, 0).submit(&request()).await.unwrap();
    assert_eq!(response.job_id.as_str(), "job-42");
    assert_eq!(response.status, JobStatus::Processing);
}

#[tokio::test]
async fn test_submit_rejection_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/skin-studio/enhance"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"success": false, "error": "Image not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 2).submit(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(ref m) if m == "Image not found"));
}

#[tokio::test]
async fn test_submit_success_false_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "error": "No credits left"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 2).submit(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(_)));
}

#[tokio::test]
async fn test_submit_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "job_id": "job-43",
            "status": "processing"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, 1).submit(&request()).await.unwrap();
    assert_eq!(response.job_id.as_str(), "job-43");
}

#[tokio::test]
async fn test_submit_gives_up_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let err = client(&server, 1).submit(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Http { status: 500, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_poll_status_processing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/skin-studio/enhance/status/job-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "job_id": "job-42",
            "status": "processing",
            "progress": 55
        })))
        .mount(&server)
        .await;

    let job_id = JobId::parse("job-42").unwrap();
    let snapshot = client(&server, 0).poll_status(&job_id).await.unwrap();
    assert_eq!(snapshot.status, JobStatus::Processing);
    assert_eq!(snapshot.progress, 55);
    assert_eq!(snapshot.raw["job_id"], "job-42");
}

#[tokio::test]
async fn test_poll_status_is_single_shot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let job_id = JobId::parse("job-42").unwrap();
    let err = client(&server, 3).poll_status(&job_id).await.unwrap_err();
    assert!(matches!(err, ClientError::Http { status: 502, .. }));
}

#[tokio::test]
async fn test_poll_status_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let job_id = JobId::parse("job-42").unwrap();
    let err = client(&server, 0).poll_status(&job_id).await.unwrap_err();
    assert!(matches!(err, ClientError::Json(_)));
}

#[tokio::test]
async fn test_poll_status_completed_without_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "completed"})))
        .mount(&server)
        .await;

    let job_id = JobId::parse("job-42").unwrap();
    let err = client(&server, 0).poll_status(&job_id).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    assert!(client(&server, 0).health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let healthy = client(&server, 0).health_check().await.unwrap();
    assert!(!healthy);
}

#[tokio::test]
async fn test_submit_bare_4xx_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/skin-studio/enhance"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 2).submit(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(ref m) if m == "HTTP 403: forbidden"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_health_check_unreachable() {
    let config = ClientConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let client = StudioClient::new(config).unwrap();
    tokio_test::assert_ok!(client.health_check().await);
    assert!(!client.health_check().await.unwrap());
}
