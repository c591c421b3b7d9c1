//! Registration and login handlers.

use axum::extract::State;
use axum::Json;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use scribe_core::{defaults, User, UserPublic};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// SHA-256 hex digest of a password.
fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Opaque session token: base64 of a JSON claims object with a 7-day expiry.
fn session_token(user: &User) -> String {
    let exp = Utc::now() + chrono::Duration::days(defaults::SESSION_TTL_DAYS);
    let claims = serde_json::json!({
        "user_id": user.id,
        "email": user.email,
        "exp": exp.timestamp_millis(),
    });
    base64::engine::general_purpose::STANDARD.encode(claims.to_string())
}

/// Register a new account.
///
/// # Returns
/// - 200 OK with a session token and public user on success
/// - 400 Bad Request on missing fields, short password, or duplicate email
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() || req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("所有字段都是必填的".to_string()));
    }
    if req.password.chars().count() < defaults::MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "密码至少需要{}位字符",
            defaults::MIN_PASSWORD_LEN
        )));
    }

    let user = User {
        id: Uuid::now_v7(),
        email: req.email.trim().to_string(),
        name: req.name.trim().to_string(),
        password_hash: hash_password(&req.password),
        created_at: Utc::now(),
    };

    let id = state.store.users.insert(user.clone()).await?;
    info!(user_id = %id, "user registered");

    Ok(Json(serde_json::json!({
        "success": true,
        "token": session_token(&user),
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
        },
    })))
}

/// Log in with email and password.
///
/// # Returns
/// - 200 OK with a session token and public user (including the
///   `notion_connected` flag) on success
/// - 400 Bad Request on unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("邮箱和密码都是必填的".to_string()));
    }

    let user = state
        .store
        .users
        .find_by_email(req.email.trim())
        .await?
        .ok_or_else(|| ApiError::BadRequest("用户不存在".to_string()))?;

    if hash_password(&req.password) != user.password_hash {
        return Err(ApiError::BadRequest("密码错误".to_string()));
    }

    let notion_connected = state
        .store
        .notion_auth
        .get(&user.id.to_string())
        .await?
        .is_some_and(|auth| auth.database_id.is_some());

    info!(user_id = %user.id, "login successful");

    let public = UserPublic {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        notion_connected,
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "token": session_token(&user),
        "user": public,
    })))
}
