mod helpers;

use axum::http::StatusCode;
use helpers::*;

#[tokio::test]
async fn signed_url_issued_with_derived_content_type() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadSignedUrl")
        .json(&serde_json::json!({ "filename": "a.txt" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("gcsPath").and_then(|v| v.as_str()),
        Some("gs://media-uploads/upload/a.txt")
    );
    assert_eq!(
        body.get("expectedContentType").and_then(|v| v.as_str()),
        Some("text/plain")
    );

    let signed_url = body
        .get("signedUrl")
        .and_then(|v| v.as_str())
        .expect("signedUrl");
    assert!(!signed_url.is_empty());
    assert!(signed_url.contains("upload/a.txt"));
    // 15-minute validity window.
    assert!(signed_url.contains("expires_in=900"));

    let location = response.header("location");
    assert_eq!(location.to_str().expect("Location header"), signed_url);
}

#[tokio::test]
async fn signed_url_respects_caller_content_type() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadSignedUrl")
        .json(&serde_json::json!({
            "filename": "data.txt",
            "contentType": "application/json"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("expectedContentType").and_then(|v| v.as_str()),
        Some("application/json")
    );
}

#[tokio::test]
async fn signed_url_falls_back_to_octet_stream() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadSignedUrl")
        .json(&serde_json::json!({ "filename": "x.bin" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("expectedContentType").and_then(|v| v.as_str()),
        Some("application/octet-stream")
    );
}

#[tokio::test]
async fn signed_url_requires_filename() {
    let app = setup_test_app().await;

    let missing = app
        .server
        .post("/uploadSignedUrl")
        .json(&serde_json::json!({}))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);

    let empty = app
        .server
        .post("/uploadSignedUrl")
        .json(&serde_json::json!({ "filename": "" }))
        .await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resumable_url_issued_with_session_url() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/uploadResumable")
        .json(&serde_json::json!({ "filename": "movie.mp4" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("gcsPath").and_then(|v| v.as_str()),
        Some("gs://media-uploads/upload/movie.mp4")
    );

    let session_url = body
        .get("sessionUrl")
        .and_then(|v| v.as_str())
        .expect("sessionUrl");
    assert!(session_url.contains("upload/movie.mp4"));

    let location = response.header("location");
    assert_eq!(location.to_str().expect("Location header"), session_url);
}

#[tokio::test]
async fn issuing_urls_does_not_touch_the_queue() {
    let app = setup_test_app().await;

    app.server
        .post("/uploadSignedUrl")
        .json(&serde_json::json!({ "filename": "a.txt" }))
        .await;
    app.server
        .post("/uploadResumable")
        .json(&serde_json::json!({ "filename": "movie.mp4" }))
        .await;

    assert_eq!(app.queue.submission_count(), 0);
}
