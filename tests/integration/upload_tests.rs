//! Upload protocol integration tests.
//!
//! Tests verify:
//! - Stored files are byte-identical and addressable at the returned URL
//! - N parts yield N ordered outcomes with distinct URLs
//! - Malformed requests (no parts, nameless parts) are rejected up front
//! - Traversal filenames never escape the storage directory
//! - Storage failures are isolated per part
//! - Stored files can be fetched back

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use imgdrop::protocol::{ErrorResponse, HealthResponse, UploadResponse};
use imgdrop::storage::derive_name;

use super::test_utils::{
    multipart_body, multipart_body_nameless_part, response_bytes, response_json, stored_files,
    test_router, upload_request, TEST_PREFIX, TEST_TOKEN,
};

// =============================================================================
// Successful Uploads
// =============================================================================

#[tokio::test]
async fn test_single_upload_stores_and_returns_url() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let content = b"not really a png, but bytes are bytes";
    let body = multipart_body(Some(TEST_TOKEN), &[("cat.png", content)]);
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed: UploadResponse = response_json(response).await;
    assert_eq!(parsed.results.len(), 1);

    let outcome = &parsed.results[0];
    assert_eq!(outcome.name, "cat.png");

    // URL is prefix + "/" + derived name, and the name is deterministic
    let expected_name = derive_name("cat.png", content);
    assert_eq!(
        outcome.url.as_deref(),
        Some(format!("{}/{}", TEST_PREFIX, expected_name).as_str())
    );

    // The stored bytes are identical to what was sent
    let on_disk = std::fs::read(dir.path().join(&expected_name)).unwrap();
    assert_eq!(on_disk, content);
}

#[tokio::test]
async fn test_multi_part_upload_ordered_and_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let parts: &[(&str, &[u8])] = &[
        ("a.png", b"first file"),
        ("b.jpg", b"second file"),
        ("c.gif", b"third file"),
    ];
    let body = multipart_body(Some(TEST_TOKEN), parts);
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed: UploadResponse = response_json(response).await;
    assert_eq!(parsed.results.len(), 3);

    // Outcomes come back in request order
    let names: Vec<&str> = parsed.results.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "b.jpg", "c.gif"]);

    // All URLs are present and distinct
    let urls: Vec<&str> = parsed
        .results
        .iter()
        .map(|o| o.url.as_deref().unwrap())
        .collect();
    let mut deduped = urls.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), 3);

    assert_eq!(stored_files(dir.path()).len(), 3);
}

#[tokio::test]
async fn test_same_original_name_different_content_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let body = multipart_body(
        Some(TEST_TOKEN),
        &[("cat.png", b"one cat"), ("cat.png", b"another cat")],
    );
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed: UploadResponse = response_json(response).await;
    assert!(parsed.results.iter().all(|o| o.is_success()));
    assert_ne!(parsed.results[0].url, parsed.results[1].url);
    assert_eq!(stored_files(dir.path()).len(), 2);
}

#[tokio::test]
async fn test_concurrent_uploads_same_name_both_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let first = router.clone().oneshot(upload_request(multipart_body(
        Some(TEST_TOKEN),
        &[("cat.png", b"payload one")],
    )));
    let second = router.clone().oneshot(upload_request(multipart_body(
        Some(TEST_TOKEN),
        &[("cat.png", b"payload two")],
    )));

    let (first, second) = tokio::join!(first, second);
    let first = first.unwrap();
    let second = second.unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let first: UploadResponse = response_json(first).await;
    let second: UploadResponse = response_json(second).await;
    assert_ne!(first.results[0].url, second.results[0].url);

    assert_eq!(stored_files(dir.path()).len(), 2);
}

// =============================================================================
// Malformed Requests
// =============================================================================

#[tokio::test]
async fn test_zero_parts_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let body = multipart_body(Some(TEST_TOKEN), &[]);
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed: ErrorResponse = response_json(response).await;
    assert_eq!(parsed.error, "empty_upload");
}

#[tokio::test]
async fn test_nameless_part_rejected_before_storage() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let body = multipart_body_nameless_part(TEST_TOKEN, b"orphan bytes");
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed: ErrorResponse = response_json(response).await;
    assert_eq!(parsed.error, "missing_filename");
    assert!(stored_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

// =============================================================================
// Path Safety
// =============================================================================

#[tokio::test]
async fn test_traversal_filename_stays_inside_storage() {
    let parent = tempfile::tempdir().unwrap();
    let storage = parent.path().join("storage");
    std::fs::create_dir(&storage).unwrap();
    let router = test_router(&storage);

    let body = multipart_body(Some(TEST_TOKEN), &[("../../etc/passwd", b"intruder")]);
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed: UploadResponse = response_json(response).await;
    let url = parsed.results[0].url.as_deref().unwrap();

    // Derived name carries no path structure
    let derived = url.rsplit('/').next().unwrap();
    assert!(!derived.contains(".."));
    assert_eq!(derived.len(), 32); // bare hash stem, "passwd" has no extension

    // Exactly one file, inside the storage dir; nothing leaked to the parent
    assert_eq!(stored_files(&storage), vec![derived.to_string()]);
    let parent_entries: Vec<String> = std::fs::read_dir(parent.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(parent_entries, vec!["storage".to_string()]);
}

#[tokio::test]
async fn test_windows_style_traversal_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let body = multipart_body(Some(TEST_TOKEN), &[("..\\..\\boot.ini", b"intruder")]);
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = stored_files(dir.path());
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].contains('\\'));
    assert!(!stored[0].contains(".."));
}

// =============================================================================
// Per-Part Failure Isolation
// =============================================================================

#[tokio::test]
async fn test_unwritable_storage_reports_per_part_error() {
    // Point the router at a storage path that is actually a regular file,
    // which breaks writes for any user (root ignores permission bits)
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"i am a file").unwrap();
    let router = test_router(&blocked);

    let body = multipart_body(Some(TEST_TOKEN), &[("cat.png", b"meow")]);
    let response = router.oneshot(upload_request(body)).await.unwrap();

    // The request still completes; the failure is scoped to the part
    assert_eq!(response.status(), StatusCode::OK);
    let parsed: UploadResponse = response_json(response).await;
    assert_eq!(parsed.results.len(), 1);
    assert_eq!(parsed.results[0].error.as_deref(), Some("io_error"));
    assert!(parsed.results[0].url.is_none());
}

// =============================================================================
// File Fetch
// =============================================================================

#[tokio::test]
async fn test_fetch_stored_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let content: &[u8] = b"round trip payload";
    let body = multipart_body(Some(TEST_TOKEN), &[("cat.png", content)]);
    let response = router
        .clone()
        .oneshot(upload_request(body))
        .await
        .unwrap();
    let parsed: UploadResponse = response_json(response).await;
    let name = parsed.results[0]
        .url
        .as_deref()
        .unwrap()
        .rsplit('/')
        .next()
        .unwrap()
        .to_string();

    let request = Request::builder()
        .uri(format!("/files/{}", name))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(response_bytes(response).await, content);
}

#[tokio::test]
async fn test_fetch_unknown_file_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let request = Request::builder()
        .uri("/files/0000000000000000000000000000dead.png")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let parsed: ErrorResponse = response_json(response).await;
    assert_eq!(parsed.error, "not_found");
}

#[tokio::test]
async fn test_fetch_traversal_name_is_404() {
    let dir = tempfile::tempdir().unwrap();
    // Make sure there is a file that traversal would love to reach
    std::fs::write(dir.path().join("present.png"), b"here").unwrap();
    let router = test_router(dir.path());

    let request = Request::builder()
        .uri("/files/..")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed: HealthResponse = response_json(response).await;
    assert_eq!(parsed.status, "healthy");
    assert_eq!(parsed.version, env!("CARGO_PKG_VERSION"));
}
