//! Notion OAuth and provisioning handlers.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use scribe_core::NotionAuth;
use scribe_notion::{normalize_database_id, DatabaseParent, NotionClient};

use crate::{ApiError, AppState};

/// Default title for provisioned databases.
const DATABASE_TITLE: &str = "智能笔记助手";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveAuthRequest {
    pub user_id: String,
    pub notion_token: String,
    pub database_id: Option<String>,
    pub workspace_id: Option<String>,
    pub workspace_name: Option<String>,
    pub bot_id: Option<String>,
    pub database_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

// =============================================================================
// OAUTH CALLBACK
// =============================================================================

/// HTML page that reports the OAuth outcome to the opener window.
fn opener_message_page(title: &str, script_payload: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title}</title><meta charset="utf-8"></head>
<body>
<script>
window.opener?.postMessage({script_payload}, "*");
setTimeout(() => window.close(), 2000);
</script>
<p>{title}</p>
</body>
</html>"#
    ))
}

fn auth_error_page(message: &str) -> Html<String> {
    let payload = json!({ "type": "NOTION_AUTH_ERROR", "error": message });
    opener_message_page("授权失败", &payload.to_string())
}

/// OAuth redirect target: exchange the code, provision the notes database,
/// and hand the credential bundle back to the opener via postMessage.
///
/// Database provisioning failure is not fatal; the token alone is still
/// returned and a database can be attached later.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Html<String> {
    if let Some(error) = query.error {
        warn!(error = %error, "Notion OAuth declined");
        return auth_error_page(&error);
    }

    let Some(code) = query.code else {
        return auth_error_page("未获取到授权码");
    };

    let Some(oauth) = state.config.oauth.clone() else {
        return auth_error_page("Notion应用配置不完整");
    };

    let tokens = match oauth.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(err) => {
            warn!(error = %err, "Notion token exchange failed");
            return auth_error_page(&format!("获取访问令牌失败: {}", err));
        }
    };

    // Provision the notes database at the workspace root.
    let (database_id, database_name) = match NotionClient::new(&tokens.access_token) {
        Ok(client) => match client
            .create_notes_database(DatabaseParent::Workspace, DATABASE_TITLE)
            .await
        {
            Ok(db) => (Some(db.id), db.title),
            Err(err) => {
                warn!(error = %err, "database provisioning failed");
                (None, DATABASE_TITLE.to_string())
            }
        },
        Err(err) => {
            warn!(error = %err, "notion client init failed");
            (None, DATABASE_TITLE.to_string())
        }
    };

    // When the authorize URL carried a user id in `state`, persist the
    // credential directly; the opener message covers the popup flow either
    // way.
    if let Some(user_id) = query.state.as_deref().filter(|s| !s.is_empty()) {
        let auth = NotionAuth {
            user_id: user_id.to_string(),
            access_token: tokens.access_token.clone(),
            workspace_id: tokens.workspace_id.clone(),
            workspace_name: tokens.workspace_name.clone(),
            bot_id: tokens.bot_id.clone(),
            database_id: database_id.clone(),
            database_name: Some(database_name.clone()),
            authorized_at: Utc::now(),
        };
        if let Err(err) = state.store.notion_auth.upsert(auth).await {
            warn!(error = %err, "failed to persist OAuth credential");
        }
    }

    info!(
        workspace = tokens.workspace_name.as_deref().unwrap_or("-"),
        provisioned = database_id.is_some(),
        "Notion OAuth completed"
    );

    let payload = json!({
        "type": "NOTION_AUTH_SUCCESS",
        "data": {
            "notion_token": tokens.access_token,
            "database_id": database_id,
            "workspace_name": tokens.workspace_name,
            "workspace_id": tokens.workspace_id,
            "bot_id": tokens.bot_id,
            "database_name": database_name,
            "authorized_at": Utc::now(),
        },
    });
    opener_message_page("授权成功！正在返回应用...", &payload.to_string())
}

// =============================================================================
// CREDENTIAL STORE
// =============================================================================

/// Save a per-user Notion credential.
pub async fn save_auth(
    State(state): State<AppState>,
    Json(req): Json<SaveAuthRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.user_id.is_empty() || req.notion_token.is_empty() {
        return Err(ApiError::BadRequest(
            "用户ID和Notion Token是必填的".to_string(),
        ));
    }

    let auth = NotionAuth {
        user_id: req.user_id.clone(),
        access_token: req.notion_token,
        workspace_id: req.workspace_id,
        workspace_name: req.workspace_name,
        bot_id: req.bot_id,
        database_id: req.database_id.map(|id| normalize_database_id(&id)),
        database_name: req.database_name,
        authorized_at: Utc::now(),
    };
    state.store.notion_auth.upsert(auth.clone()).await?;
    info!(user_id = %req.user_id, "notion credential stored");

    Ok(Json(json!({
        "success": true,
        "message": "Notion授权成功",
        "auth_data": auth,
    })))
}

/// Read a per-user Notion credential.
pub async fn get_auth(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = query
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("用户ID是必填的".to_string()))?;

    match state.store.notion_auth.get(&user_id).await? {
        Some(auth) => Ok(Json(json!({
            "authorized": true,
            "notion_token": auth.access_token,
            "database_id": auth.database_id,
            "workspace_name": auth.workspace_name,
            "database_name": auth.database_name,
            "authorized_at": auth.authorized_at,
        }))),
        None => Ok(Json(json!({
            "authorized": false,
            "notion_token": serde_json::Value::Null,
            "database_id": serde_json::Value::Null,
        }))),
    }
}

/// Authorization probe used by the WeChat channel and the frontend.
pub async fn auth_status(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = query
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("用户ID是必填的".to_string()))?;

    let auth = state.store.notion_auth.get(&user_id).await?;
    Ok(Json(json!({
        "authorized": auth.is_some(),
        "notion_token": auth.as_ref().map(|a| a.access_token.clone()),
        "database_id": auth.as_ref().and_then(|a| a.database_id.clone()),
        "authorized_at": auth.as_ref().map(|a| a.authorized_at),
    })))
}

// =============================================================================
// PROVISIONING & PROBES
// =============================================================================

/// Provision the notes database with an integration token: header
/// `X-Notion-Token` wins over the server-level credential. A visible page is
/// preferred as parent; the workspace root is the fallback.
pub async fn setup_notion(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let header_token = headers
        .get("X-Notion-Token")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    let token = header_token
        .or_else(|| state.config.notion_api_key.clone())
        .ok_or_else(|| ApiError::ServiceUnavailable("Notion API key 未配置".to_string()))?;

    let client = NotionClient::new(&token)?;
    client
        .current_user()
        .await
        .map_err(|e| ApiError::UpstreamFailed(format!("无法获取用户信息: {}", e)))?;

    let parent = match client.search_first_page().await {
        Ok(Some(page_id)) => DatabaseParent::Page(page_id),
        Ok(None) => DatabaseParent::Workspace,
        Err(err) => {
            warn!(error = %err, "page search failed, provisioning at workspace root");
            DatabaseParent::Workspace
        }
    };

    let database = client
        .create_notes_database(parent, DATABASE_TITLE)
        .await
        .map_err(|e| ApiError::UpstreamFailed(format!("创建数据库失败: {}", e)))?;

    Ok(Json(json!({
        "success": true,
        "database": {
            "id": database.id,
            "url": database.url,
            "title": database.title,
        },
        "message": "✅ 成功创建智能笔记助手数据库！",
    })))
}

/// Connectivity probe for the server-level Notion configuration. Failures
/// come back as a structured body with error-specific suggestions.
pub async fn test_notion(
    State(state): State<AppState>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ApiError> {
    let (Some(api_key), Some(database_id)) = (
        state.config.notion_api_key.as_deref(),
        state.config.notion_database_id.as_deref(),
    ) else {
        return Err(ApiError::ServiceUnavailable(
            "Notion API key 或 Database ID 未配置".to_string(),
        ));
    };

    let database_id = normalize_database_id(database_id);
    let client = NotionClient::new(api_key)?;

    match client.retrieve_database(&database_id).await {
        Ok(database) => Ok((
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "database": {
                    "id": database.id,
                    "title": database.title,
                    "properties": database
                        .properties
                        .iter()
                        .map(|(name, _)| name.clone())
                        .collect::<Vec<_>>(),
                },
                "message": "✅ Notion 数据库连接成功！",
            })),
        )),
        Err(err) => {
            let message = err.to_string();
            let (error, suggestions): (&str, Vec<&str>) = if message.contains("object_not_found") {
                (
                    "数据库未找到",
                    vec![
                        "1. 确认数据库 ID 是否正确",
                        "2. 确保 Notion 集成已被添加到该数据库",
                        "3. 检查数据库是否存在且可访问",
                    ],
                )
            } else if message.contains("unauthorized") {
                (
                    "权限不足",
                    vec![
                        "1. 检查 API Token 是否正确",
                        "2. 确保集成有访问数据库的权限",
                    ],
                )
            } else {
                ("连接失败", vec![])
            };

            Ok((
                axum::http::StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": error,
                    "details": message,
                    "suggestions": suggestions,
                    "database_id": database_id,
                })),
            ))
        }
    }
}
