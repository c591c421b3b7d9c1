//! API error type and HTTP status mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use scribe_core::Error;

/// Error surfaced by HTTP handlers.
///
/// Taxonomy mapping: validation → 400, not-found → 404, unauthorized → 401,
/// missing configuration → 503, upstream analyzer/Notion failure → 502,
/// everything else → 500. Notion mirror failures inside create paths never
/// reach this type; they are logged and swallowed at the call site.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    ServiceUnavailable(String),
    UpstreamFailed(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::NoteNotFound(_) => ApiError::NotFound("笔记不存在".to_string()),
            Error::DocumentNotFound(_) => ApiError::NotFound("文档不存在".to_string()),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Config(msg) => ApiError::ServiceUnavailable(msg),
            Error::Inference(msg) => ApiError::UpstreamFailed(format!("AI分析失败: {}", msg)),
            Error::Notion(msg) => ApiError::UpstreamFailed(format!("Notion调用失败: {}", msg)),
            Error::Request(msg) => ApiError::UpstreamFailed(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::UpstreamFailed(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
