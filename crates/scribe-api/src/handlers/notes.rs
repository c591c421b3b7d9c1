//! Note CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use scribe_core::{defaults, Category, ListNotesRequest, ListNotesResponse, Note};
use scribe_notion::{blocks, NotionClient};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub content: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub content: String,
}

/// Resolve an optional category filter. `全部` and absence both mean
/// "no filter"; anything else must be one of the four category labels.
pub(crate) fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ApiError> {
    match raw {
        None | Some("全部") | Some("") => Ok(None),
        Some(label) => label.parse::<Category>().map(Some).map_err(ApiError::from),
    }
}

/// Create a note: analyze the text, store the record, then mirror to the
/// user's Notion database best-effort.
///
/// # Returns
/// - 200 OK with the stored note
/// - 400 Bad Request on missing content or user id
/// - 502 Bad Gateway when analysis fails
/// - 503 Service Unavailable when the analyzer is not configured
pub async fn create_note(
    State(state): State<AppState>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.content.trim().is_empty() || req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("内容和用户ID都是必填的".to_string()));
    }

    let analyzer = state.analyzer()?;
    let analysis = analyzer.analyze_note(&req.content).await?;
    let note = Note::new(req.user_id.clone(), req.content.clone(), analysis);
    let id = state.store.notes.insert(note.clone()).await?;
    info!(note_id = %id, user_id = %req.user_id, "note created");

    // Mirror failures never fail the create; at-most-once, no retry queue.
    mirror_note(&state, &note).await;

    Ok(Json(serde_json::json!({
        "success": true,
        "note": note,
    })))
}

async fn mirror_note(state: &AppState, note: &Note) {
    let auth = match state.store.notion_auth.get(&note.user_id).await {
        Ok(Some(auth)) => auth,
        Ok(None) => return,
        Err(err) => {
            warn!(error = %err, "notion credential lookup failed");
            return;
        }
    };
    let Some(database_id) = auth.database_id else {
        return;
    };

    let result = async {
        let client = NotionClient::new(&auth.access_token)?;
        client
            .create_page(blocks::note_page_body(&database_id, note))
            .await
    }
    .await;

    match result {
        Ok(page_id) => debug!(note_id = %note.id, page_id = %page_id, "note mirrored to Notion"),
        Err(err) => warn!(note_id = %note.id, error = %err, "notion mirror failed"),
    }
}

/// List a user's notes, newest first.
pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListNotesResponse>, ApiError> {
    let user_id = query
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("用户ID是必填的".to_string()))?;

    let response = state
        .store
        .notes
        .list(ListNotesRequest {
            user_id,
            category: parse_category(query.category.as_deref())?,
            page: query.page.unwrap_or(defaults::PAGE_FIRST).max(1),
            limit: query.limit.unwrap_or(defaults::PAGE_LIMIT),
        })
        .await?;

    Ok(Json(response))
}

/// Fetch a single note.
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = state.store.notes.fetch(id).await?;
    Ok(Json(note))
}

/// Replace a note's original content.
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let note = state.store.notes.update_content(id, &req.content).await?;
    info!(note_id = %id, "note updated");
    Ok(Json(serde_json::json!({
        "success": true,
        "note": note,
    })))
}

/// Delete a note.
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.notes.delete(id).await?;
    info!(note_id = %id, "note deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}
