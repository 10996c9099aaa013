mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use common::{FailingStatusStore, MockStorageService, app_state, test_state};
use http_body_util::BodyExt;
use merlin_uploader::create_app;
use merlin_uploader::services::status_store::StatusStore;
use serde_json::value::RawValue;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tower::ServiceExt;

const FOLDER: &str = "abc123_20240115093000";

async fn setup() -> (Router, Arc<MockStorageService>, Arc<dyn StatusStore>) {
    let storage = Arc::new(MockStorageService::new("https://storage.test"));
    let (state, status_store) = test_state(storage.clone()).await;
    let status_store: Arc<dyn StatusStore> = status_store;
    (create_app(state), storage, status_store)
}

async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send_raw(app, request).await;
    let json = serde_json::from_str(&body).unwrap_or(Value::Null);
    (status, json)
}

fn post_upload(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_video_upload_url_targets_video_bucket() {
    let (app, storage, _) = setup().await;

    let (status, body) = send(
        &app,
        post_upload(json!({"name": "clip.mp4", "type": "video/mp4", "folderName": FOLDER})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let url = body["url"].as_str().unwrap();
    assert!(url.contains("merlin-user-video-bucket/abc123_20240115093000/clip.mp4"));

    let calls = storage.presign_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "PUT");
    assert_eq!(calls[0].bucket, "merlin-user-video-bucket");
    assert_eq!(calls[0].key, "abc123_20240115093000/clip.mp4");
    assert_eq!(calls[0].content_type.as_deref(), Some("video/mp4"));
    assert_eq!(calls[0].expires_in, Duration::from_secs(60));
}

#[tokio::test]
async fn test_text_upload_url_targets_script_bucket() {
    let (app, storage, _) = setup().await;

    let (status, _) = send(
        &app,
        post_upload(json!({"name": "script.txt", "type": "text/plain", "folderName": FOLDER})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let calls = storage.presign_calls();
    assert_eq!(calls[0].bucket, "merlin-user-script-upload-bucket");
    assert_eq!(calls[0].key, "abc123_20240115093000/script.txt");
}

#[tokio::test]
async fn test_upload_without_folder_name_is_rejected() {
    let (app, storage, _) = setup().await;

    for body in [
        json!({"name": "clip.mp4", "type": "video/mp4"}),
        json!({"name": "clip.mp4", "type": "video/mp4", "folderName": ""}),
        json!({"name": "clip.mp4", "type": "video/mp4", "folderName": null}),
    ] {
        let (status, json) = send(&app, post_upload(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"error": "Folder name is required"}));
    }

    assert!(storage.presign_calls().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_name_is_rejected() {
    let (app, storage, _) = setup().await;

    let (status, json) = send(
        &app,
        post_upload(json!({"type": "video/mp4", "folderName": FOLDER})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "File name is required"}));
    assert!(storage.presign_calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_type_is_a_server_error() {
    let (app, storage, _) = setup().await;

    for content_type in [json!("image/png"), json!("application/pdf"), json!(null)] {
        let (status, json) = send(
            &app,
            post_upload(json!({"name": "x", "type": content_type, "folderName": FOLDER})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({"error": "Error creating signed URL"}));
    }

    assert!(storage.presign_calls().is_empty());
}

#[tokio::test]
async fn test_signing_failure_hides_details() {
    let (app, storage, _) = setup().await;
    storage.fail_presign.store(true, Ordering::SeqCst);

    let (status, body) = send_raw(
        &app,
        post_upload(json!({"name": "clip.mp4", "type": "video/mp4", "folderName": FOLDER})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"Error creating signed URL"}"#);
    assert!(storage.presign_calls().is_empty());
}

#[tokio::test]
async fn test_upload_routing_uses_prefix_only() {
    let (app, storage, _) = setup().await;

    let (status, _) = send(
        &app,
        post_upload(json!({"name": "a.mp4", "type": "video/mp4 bogus", "folderName": FOLDER})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(storage.presign_calls()[0].bucket, "merlin-user-video-bucket");

    let (status, json) = send(
        &app,
        post_upload(json!({"name": "b.mp4", "type": "VIDEO/mp4", "folderName": FOLDER})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Error creating signed URL"}));
    assert_eq!(storage.presign_calls().len(), 1);
}

#[tokio::test]
async fn test_malformed_upload_body_is_a_client_error() {
    let (app, storage, _) = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert!(storage.presign_calls().is_empty());
}

#[tokio::test]
async fn test_wrong_methods_are_rejected() {
    let (app, storage, _) = setup().await;

    let cases = [
        ("GET", "/api/upload"),
        ("PUT", "/api/upload"),
        ("POST", "/api/check-processing-status?folderName=abc123_20240115093000"),
        ("DELETE", "/api/check-stitched-video?folderName=abc123_20240115093000"),
    ];

    for (method, uri) in cases {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(json, json!({"error": "Method not allowed"}));
    }

    assert!(storage.presign_calls().is_empty());
    assert_eq!(storage.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_status_missing_folder_name() {
    let storage = Arc::new(MockStorageService::new("https://storage.test"));
    let status_store = Arc::new(FailingStatusStore::default());
    let app = create_app(app_state(storage, status_store.clone()));

    for uri in [
        "/api/check-processing-status",
        "/api/check-processing-status?folderName=",
        "/api/check-processing-status?folderId=abc123_20240115093000",
    ] {
        let (status, json) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json, json!({"error": "Folder name is required"}));
    }

    assert_eq!(status_store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_status_record_is_returned_verbatim() {
    let (app, _, status_store) = setup().await;
    let uri = format!("/api/check-processing-status?folderName={}", FOLDER);

    let (status, json) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"error": "Status not found"}));

    // writer's key order and number formatting must survive
    let text = r#"{"status":"STITCHING","folderName":"abc123_20240115093000","progress":1.50,"inputs":{"videos":2,"scripts":1}}"#;
    let record = RawValue::from_string(text.to_string()).unwrap();
    status_store.put(FOLDER, &record).await.unwrap();

    let (status, body) = send_raw(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, text);

    // other sessions are unaffected
    let (status, _) = send(
        &app,
        get("/api/check-processing-status?folderName=zzz999_20240115093000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_store_failure_hides_details() {
    let storage = Arc::new(MockStorageService::new("https://storage.test"));
    let status_store = Arc::new(FailingStatusStore::default());
    let app = create_app(app_state(storage, status_store.clone()));

    let (status, body) = send_raw(
        &app,
        get("/api/check-processing-status?folderName=abc123_20240115093000"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"Error checking processing status"}"#);
    assert_eq!(status_store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_query_gets_json_error() {
    let (app, storage, _) = setup().await;

    for uri in [
        "/api/check-processing-status?folderName=a&folderName=b",
        "/api/check-stitched-video?folderName=a&folderName=b",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string(), "{uri}");
    }

    assert_eq!(storage.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stitched_video_unavailable_is_success() {
    let (app, storage, _) = setup().await;

    let (status, json) = send(
        &app,
        get("/api/check-stitched-video?folderName=abc123_20240115093000"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"available": false}));
    assert_eq!(storage.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stitched_video_available_returns_read_url_for_first_object() {
    let (app, storage, _) = setup().await;
    storage.put_object(
        "merlin-stitched-video-bucket",
        "abc123_20240115093000/a-final.mp4",
        b"stitched",
    );
    storage.put_object(
        "merlin-stitched-video-bucket",
        "abc123_20240115093000/b-thumbnail.jpg",
        b"thumb",
    );
    // same prefix without the separator must not match
    storage.put_object(
        "merlin-stitched-video-bucket",
        "abc123_20240115093000x/other.mp4",
        b"other",
    );

    let (status, json) = send(
        &app,
        get("/api/check-stitched-video?folderName=abc123_20240115093000"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["available"], true);
    assert!(
        json["url"]
            .as_str()
            .unwrap()
            .contains("abc123_20240115093000/a-final.mp4")
    );

    let calls = storage.presign_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "GET");
    assert_eq!(calls[0].bucket, "merlin-stitched-video-bucket");
    assert_eq!(calls[0].key, "abc123_20240115093000/a-final.mp4");
    assert!(calls[0].expires_in >= Duration::from_secs(3600));
}

#[tokio::test]
async fn test_stitched_video_missing_folder_does_not_list() {
    let (app, storage, _) = setup().await;

    let (status, json) = send(&app, get("/api/check-stitched-video")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "Folder name is required"}));
    assert_eq!(storage.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_listing_failure_hides_details() {
    let (app, storage, _) = setup().await;
    storage.fail_listing.store(true, Ordering::SeqCst);

    let (status, body) = send_raw(
        &app,
        get("/api/check-stitched-video?folderName=abc123_20240115093000"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"Error checking for stitched video"}"#);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let (app, _, _) = setup().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(response.headers()["cache-control"], "no-store");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn test_openapi_document_lists_endpoints() {
    let (app, _, _) = setup().await;

    let (status, json) = send(&app, get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    let paths = json["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/upload"));
    assert!(paths.contains_key("/api/check-processing-status"));
    assert!(paths.contains_key("/api/check-stitched-video"));
}
