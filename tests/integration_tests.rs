//! Integration tests for the docshift upload service

mod common;

use std::env;
use std::io::{Cursor, Read};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use docshift::{create_router, AppState, Config};

fn app() -> Router {
    create_router(AppState::new(Config::default()))
}

fn upload_request(path: &str, field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let (content_type, body) = common::multipart_file(field, file_name, content);
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn test_index_page_contract() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains(r#"id="uploadForm""#));
    assert!(html.contains(r#"id="file""#));
    assert!(html.contains(r#"action="/upload""#));
    assert!(html.contains("Please select a file first"));
}

#[tokio::test]
async fn test_upload_returns_workbook() {
    let response = app()
        .oneshot(upload_request("/upload", "file", "Lesson One.docx", &common::exercise_docx()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Lesson_One.xlsx\""
    );

    let bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut workbook_xml = String::new();
    archive
        .by_name("xl/workbook.xml")
        .unwrap()
        .read_to_string(&mut workbook_xml)
        .unwrap();
    assert!(workbook_xml.contains("ex_data"));
    assert!(workbook_xml.contains("qa_data"));
}

#[tokio::test]
async fn test_upload_rejects_wrong_extension() {
    let response = app()
        .oneshot(upload_request("/upload", "file", "report.pdf", b"%PDF-1.4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Invalid file type. Please upload a .docx file"));
}

#[tokio::test]
async fn test_upload_without_selection() {
    let response = app()
        .oneshot(upload_request("/upload", "file", "", b""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("No file selected"));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let response = app()
        .oneshot(upload_request("/upload", "attachment", "lesson.docx", b"data"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("No file part"));
}

#[tokio::test]
async fn test_upload_document_without_questions() {
    let docx = common::create_test_docx(&["exid : A1", "labels : none"]);
    let response = app()
        .oneshot(upload_request("/upload", "file", "lesson.docx", &docx))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Error converting file. Please try again."));
}

#[tokio::test]
async fn test_upload_empty_document_is_conversion_error() {
    let response = app()
        .oneshot(upload_request("/upload", "file", "lesson.docx", b""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Error converting file. Please try again."));
    assert!(!html.contains("Invalid file type"));
}

#[tokio::test]
async fn test_upload_over_size_limit() {
    let config = Config {
        max_file_size_mb: 1,
        ..Config::default()
    };

    // Fits the body limit, caught by the explicit size check
    let content = vec![b'x'; 1024 * 1024 + 1000];
    let response = create_router(AppState::new(config.clone()))
        .oneshot(upload_request("/upload", "file", "lesson.docx", &content))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("File too large: 1MB exceeds limit of 1MB"));

    // Exceeds the body limit itself
    let content = vec![b'x'; 2 * 1024 * 1024];
    let response = create_router(AppState::new(config))
        .oneshot(upload_request("/upload", "file", "lesson.docx", &content))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Upload exceeds limit of 1MB"));
}

#[tokio::test]
async fn test_busy_limiter_keeps_page_for_uploads() {
    let state = AppState::new(Config {
        max_concurrent_requests: 1,
        ..Config::default()
    });
    let _held = state.limiter.try_acquire().unwrap();

    let response = create_router(state.clone())
        .oneshot(upload_request("/upload", "file", "lesson.docx", &common::exercise_docx()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains(r#"id="uploadForm""#));
    assert!(html.contains("Rate limit exceeded"));

    let response = create_router(state.clone())
        .oneshot(upload_request(
            "/generate-text-files",
            "file",
            "lesson.docx",
            &common::exercise_docx(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["error"]["code"], "RATE_LIMIT_EXCEEDED");

    // Page loads are not limited
    let response = create_router(state.clone())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.limiter.metrics().rejected_requests, 2);
}

#[tokio::test]
async fn test_generate_times_out() {
    let config = Config {
        request_timeout_seconds: 0,
        ..Config::default()
    };
    let mut lines = vec!["qlocation : big", "Code:"];
    lines.extend(std::iter::repeat("print('still going')").take(100_000));
    lines.push("Answer the following questions:");
    let docx = common::create_test_docx(&lines);

    let response = create_router(AppState::new(config))
        .oneshot(upload_request("/generate-text-files", "file", "big.docx", &docx))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["error"]["code"], "REQUEST_TIMEOUT");
}

#[tokio::test]
async fn test_generate_text_files_returns_zip() {
    let response = app()
        .oneshot(upload_request(
            "/generate-text-files",
            "file",
            "lesson.DOCX",
            &common::exercise_docx(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"code_files.zip\""
    );

    let bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 1);

    let mut code = String::new();
    archive.by_name("test.txt").unwrap().read_to_string(&mut code).unwrap();
    assert_eq!(
        code,
        "def hello_world():\n    print('Hello, World!')\n    return True"
    );
}

#[tokio::test]
async fn test_generate_without_code_blocks_is_json_error() {
    let docx = common::create_test_docx(&["exid : A1", "qlocation : a"]);
    let response = app()
        .oneshot(upload_request("/generate-text-files", "file", "lesson.docx", &docx))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("no code blocks"));
}

#[tokio::test]
async fn test_generate_with_corrupted_document() {
    let response = app()
        .oneshot(upload_request("/generate-text-files", "file", "broken.docx", b"not a zip at all"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["error"]["code"], "DOCUMENT_ERROR");
}

#[tokio::test]
async fn test_generate_rejects_non_multipart() {
    let request = Request::builder()
        .method("POST")
        .uri("/generate-text-files")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_health_endpoints() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "docshift");
    assert_eq!(json["limits"]["max_file_size_mb"], 16);

    let response = app()
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_config_loading() {
    env::set_var("SERVER_HOST", "127.0.0.1");
    env::set_var("SERVER_PORT", "8080");
    env::set_var("MAX_FILE_SIZE_MB", "5");
    env::set_var("MAX_CONCURRENT_REQUESTS", "not-a-number");
    env::remove_var("PORT");

    let config = Config::from_env().unwrap();
    assert_eq!(config.server_host, "127.0.0.1");
    assert_eq!(config.server_port, 8080);
    assert_eq!(config.max_file_size_mb, 5);
    // Unparsable values fall back to the default
    assert_eq!(config.max_concurrent_requests, 32);

    env::set_var("PORT", "9090");
    let config = Config::from_env().unwrap();
    assert_eq!(config.server_port, 9090);

    env::remove_var("SERVER_HOST");
    env::remove_var("SERVER_PORT");
    env::remove_var("MAX_FILE_SIZE_MB");
    env::remove_var("MAX_CONCURRENT_REQUESTS");
    env::remove_var("PORT");
}
