mod helpers;

use axum::http::StatusCode;
use helpers::*;
use std::sync::Arc;

#[tokio::test]
async fn relevant_notification_creates_exactly_one_job() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&push_envelope("OBJECT_FINALIZE", BUCKET, "upload/f.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(app.queue.submission_count(), 1);

    let body: serde_json::Value = response.json();
    let job_id = body.get("jobId").and_then(|v| v.as_str()).expect("jobId");
    assert!(!job_id.is_empty());
    assert_eq!(
        body.get("gcsPath").and_then(|v| v.as_str()),
        Some("gs://media-uploads/upload/f.png")
    );

    let payload = app.queue.last_payload().expect("one submission");
    assert_eq!(payload.gcs_path, "gs://media-uploads/upload/f.png");
    assert_eq!(payload.job_id.to_string(), job_id);
}

#[tokio::test]
async fn non_finalize_event_is_acknowledged_without_job() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&push_envelope("OBJECT_DELETE", BUCKET, "upload/f.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.queue.submission_count(), 0);
}

#[tokio::test]
async fn foreign_bucket_is_acknowledged_without_job() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&push_envelope(
            "OBJECT_FINALIZE",
            "somebody-elses-bucket",
            "upload/f.png",
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.queue.submission_count(), 0);
}

#[tokio::test]
async fn foreign_prefix_is_acknowledged_without_job() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&push_envelope(
            "OBJECT_FINALIZE",
            BUCKET,
            "thumbnails/f.png",
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.queue.submission_count(), 0);
}

#[tokio::test]
async fn missing_authorization_header_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadNotification")
        .json(&push_envelope("OBJECT_FINALIZE", BUCKET, "upload/f.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.queue.submission_count(), 0);
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", "Bearer not-a-real-token")
        .json(&push_envelope("OBJECT_FINALIZE", BUCKET, "upload/f.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.queue.submission_count(), 0);
}

#[tokio::test]
async fn unverified_email_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", UNVERIFIED_TOKEN))
        .json(&push_envelope("OBJECT_FINALIZE", BUCKET, "upload/f.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.queue.submission_count(), 0);
}

#[tokio::test]
async fn mismatched_identity_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", WRONG_IDENTITY_TOKEN))
        .json(&push_envelope("OBJECT_FINALIZE", BUCKET, "upload/f.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.queue.submission_count(), 0);
}

#[tokio::test]
async fn redelivered_event_collapses_onto_one_task() {
    let app = setup_test_app().await;
    let envelope = push_envelope_with_generation(
        "OBJECT_FINALIZE",
        BUCKET,
        "upload/f.png",
        "1714564800000000",
    );

    let first = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&envelope)
        .await;
    let second = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&envelope)
        .await;

    assert_eq!(first.status_code(), StatusCode::CREATED);
    assert_eq!(second.status_code(), StatusCode::CREATED);

    let first_body: serde_json::Value = first.json();
    let second_body: serde_json::Value = second.json();
    assert_eq!(first_body.get("jobId"), second_body.get("jobId"));
    assert_eq!(first_body.get("taskId"), second_body.get("taskId"));

    // The queue saw the duplicate name and kept a single entry.
    assert_eq!(app.queue.submission_count(), 1);
}

#[tokio::test]
async fn new_generation_creates_a_new_job() {
    let app = setup_test_app().await;

    app.server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&push_envelope_with_generation(
            "OBJECT_FINALIZE",
            BUCKET,
            "upload/f.png",
            "100",
        ))
        .await;
    app.server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&push_envelope_with_generation(
            "OBJECT_FINALIZE",
            BUCKET,
            "upload/f.png",
            "101",
        ))
        .await;

    assert_eq!(app.queue.submission_count(), 2);
}

#[tokio::test]
async fn dispatch_failure_returns_500_without_provider_detail() {
    let (server, _temp_dir) = setup_test_server(Arc::new(FailingQueue)).await;

    let response = server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&push_envelope("OBJECT_FINALIZE", BUCKET, "upload/f.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.text();
    assert!(body.contains("DISPATCH_ERROR"));
    // Provider diagnostics stay in the server log.
    assert!(!body.contains("RESOURCE_EXHAUSTED"));
}

#[tokio::test]
async fn envelope_without_attributes_is_acknowledged() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadNotification")
        .add_header("Authorization", format!("Bearer {}", VALID_TOKEN))
        .json(&serde_json::json!({ "message": {} }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.queue.submission_count(), 0);
}
