//! # scribe-api
//!
//! HTTP API server for scribe: note/document capture with LLM analysis,
//! chat-report generation, Notion mirroring, and the WeChat webhook channel.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use scribe_core::defaults;

pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;

/// Generates time-ordered UUIDv7 request correlation ids.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the full application router over the given state.
pub fn app(state: AppState) -> Router {
    use handlers::*;

    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        // Notes
        .route("/api/notes", post(notes::create_note).get(notes::list_notes))
        .route(
            "/api/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        // Documents
        .route(
            "/api/documents",
            post(documents::upload_document).get(documents::list_documents),
        )
        .route(
            "/api/documents/:id",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        )
        // Chat reports & friends
        .route("/api/process-chat", post(chat::process_chat))
        .route("/api/save-to-notion", post(chat::save_to_notion))
        .route(
            "/api/friends",
            post(chat::create_friend_profile).get(chat::get_friend),
        )
        // Monthly reports
        .route("/api/monthly-report", post(reports::monthly_report))
        .route("/api/monthly-summary", post(reports::monthly_summary))
        // Notion
        .route("/api/notion/callback", get(notion::oauth_callback))
        .route(
            "/api/notion/auth",
            post(notion::save_auth).get(notion::get_auth),
        )
        .route("/api/user/auth-status", get(notion::auth_status))
        .route("/api/setup-notion", post(notion::setup_notion))
        .route("/api/test-notion", get(notion::test_notion))
        // WeChat webhook
        .route(
            "/api/wechat/webhook",
            get(wechat::verify_webhook).post(wechat::receive_message),
        )
        // System
        .route("/api/config-status", get(system::config_status))
        .route("/health", get(system::health_check))
        // Layers
        .layer(DefaultBodyLimit::max(defaults::BODY_LIMIT_BYTES))
        .layer(RequestBodyLimitLayer::new(defaults::BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
