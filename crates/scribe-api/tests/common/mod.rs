//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use tower::ServiceExt;

use scribe_api::{app, ApiConfig, AppState};
use scribe_inference::{Analyzer, MockBackend};
use scribe_store::Store;

/// Configuration with every external feature disabled.
pub fn test_config() -> ApiConfig {
    ApiConfig {
        public_base_url: "http://localhost:3000".to_string(),
        wechat_token: "test_wechat_token".to_string(),
        notion_api_key: None,
        notion_database_id: None,
        oauth: None,
        port: 3000,
    }
}

/// State whose analyzer replies with the given canned responses (the last
/// reply repeats once drained).
pub fn state_with_mock(replies: Vec<&str>) -> AppState {
    AppState {
        store: Store::in_memory(),
        analyzer: Some(Arc::new(Analyzer::new(Arc::new(MockBackend::replying(
            replies,
        ))))),
        config: Arc::new(test_config()),
    }
}

/// State whose analyzer always fails.
pub fn state_with_failing_analyzer() -> AppState {
    AppState {
        store: Store::in_memory(),
        analyzer: Some(Arc::new(Analyzer::new(Arc::new(MockBackend::failing(
            "model unavailable",
        ))))),
        config: Arc::new(test_config()),
    }
}

/// State with the analyzer feature disabled.
pub fn state_without_analyzer() -> AppState {
    AppState {
        store: Store::in_memory(),
        analyzer: None,
        config: Arc::new(test_config()),
    }
}

pub fn router(state: AppState) -> Router {
    app(state)
}

pub async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

/// Minimal multipart body with a `file` part and a `user_id` part.
pub fn multipart_upload(
    boundary: &str,
    file_name: &str,
    content: &str,
    user_id: &str,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"user_id\"\r\n\r\n{user_id}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content.as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (
        format!("multipart/form-data; boundary={boundary}"),
        body,
    )
}

/// Canned note-analysis reply for the mock backend.
pub fn note_analysis_json() -> &'static str {
    r#"{
        "title": "测试笔记",
        "summary": "这是一条测试摘要",
        "category": "日常",
        "tags": ["测试", "笔记", "日常"],
        "priority": "中",
        "action_items": ["整理归档"],
        "insights": ["保持记录的习惯"]
    }"#
}

/// Canned document-analysis reply for the mock backend.
pub fn document_analysis_json() -> &'static str {
    r#"{
        "title": "测试文档",
        "summary": "文档摘要",
        "category": "工作",
        "tags": ["文档", "工作"],
        "key_points": ["要点一", "要点二", "要点三"],
        "action_items": [],
        "document_type": "报告"
    }"#
}
