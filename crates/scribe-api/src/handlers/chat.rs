//! Chat-report and friend-profile handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use scribe_core::{ChatReport, Error, FriendProfile};
use scribe_inference::basic_chat_report;
use scribe_notion::{blocks, normalize_database_id, NotionClient};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ProcessChatRequest {
    pub chat_content: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveToNotionRequest {
    pub report: ChatReport,
    pub notion_token: String,
    pub database_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FriendProfileRequest {
    pub friend_name: String,
    pub chat_history: String,
}

#[derive(Debug, Deserialize)]
pub struct FriendQuery {
    pub name: Option<String>,
}

/// Turn a chat transcript into a diary-style report.
///
/// Degradation chain: structured analysis → plain-text analysis with
/// line-prefix extraction → heuristic parse with a canned narrative. Only a
/// validation error surfaces to the caller; an analyzer that is down still
/// yields the basic report.
pub async fn process_chat(
    State(state): State<AppState>,
    Json(req): Json<ProcessChatRequest>,
) -> Result<Json<ChatReport>, ApiError> {
    if req.chat_content.trim().is_empty() {
        return Err(ApiError::BadRequest("聊天记录是必填的".to_string()));
    }

    let analyzer = state.analyzer()?;
    match analyzer.chat_report(&req.chat_content).await {
        Ok(report) => Ok(Json(report)),
        Err(Error::Inference(msg)) => {
            warn!(error = %msg, "chat analysis failed, returning basic report");
            Ok(Json(basic_chat_report(&req.chat_content)))
        }
        Err(other) => Err(other.into()),
    }
}

/// Save a chat report to the caller's own Notion database.
///
/// The database is retrieved first, both to verify access and to map the
/// report onto whatever properties it actually has.
pub async fn save_to_notion(
    Json(req): Json<SaveToNotionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.notion_token.is_empty() || req.database_id.is_empty() {
        return Err(ApiError::BadRequest(
            "缺少Notion Token或数据库ID，请重新授权。".to_string(),
        ));
    }

    let database_id = normalize_database_id(&req.database_id);
    let client = NotionClient::new(&req.notion_token)?;

    let database = client.retrieve_database(&database_id).await.map_err(|e| {
        ApiError::UpstreamFailed(format!(
            "无法访问数据库: {}。请确保 Notion 集成已被添加到该数据库",
            e
        ))
    })?;

    let page_id = client
        .create_page(blocks::chat_page_body(&database, &req.report))
        .await?;
    info!(page_id = %page_id, "chat report saved to Notion");

    Ok(Json(serde_json::json!({
        "success": true,
        "page_id": page_id,
    })))
}

/// Generate a friend personality profile from chat history.
pub async fn create_friend_profile(
    State(state): State<AppState>,
    Json(req): Json<FriendProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.chat_history.trim().is_empty() {
        return Err(ApiError::BadRequest("聊天记录是必填的".to_string()));
    }

    let analyzer = state.analyzer()?;
    let profile: FriendProfile = analyzer
        .friend_profile(&req.friend_name, &req.chat_history)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "profile": profile,
    })))
}

/// Summary card for a friend. Interaction history is not persisted, so this
/// answers a fixed placeholder shape.
pub async fn get_friend(
    Query(query): Query<FriendQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let name = query
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("朋友姓名是必填的".to_string()))?;

    Ok(Json(serde_json::json!({
        "name": name,
        "total_chats": 0,
        "last_chat_date": serde_json::Value::Null,
        "emotional_trends": ["温馨"],
        "common_topics": [],
    })))
}
