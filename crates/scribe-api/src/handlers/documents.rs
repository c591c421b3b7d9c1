//! Document upload and CRUD handlers.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use scribe_core::defaults::{MAX_DOCUMENT_BYTES, MAX_DOCUMENT_CHARS, PAGE_FIRST, PAGE_LIMIT};
use scribe_core::{Document, ListDocumentsRequest, ListDocumentsResponse};
use scribe_notion::{blocks, NotionClient};

use crate::handlers::notes::parse_category;
use crate::{ApiError, AppState};

use super::notes::ListQuery;

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub content: String,
}

/// Validate the upload limits. Both checks are strict: a file of exactly
/// 25 MB or exactly 200,000 decoded characters is accepted.
pub(crate) fn validate_upload(file_size: u64, char_count: usize) -> Result<(), ApiError> {
    if file_size > MAX_DOCUMENT_BYTES {
        return Err(ApiError::BadRequest("文件大小不能超过 25MB".to_string()));
    }
    if char_count > MAX_DOCUMENT_CHARS {
        return Err(ApiError::BadRequest(
            "文件内容过长，请上传更小的文件".to_string(),
        ));
    }
    Ok(())
}

/// Upload a document (multipart `file` + `user_id`), analyze it, store it,
/// and mirror best-effort to the user's Notion database.
///
/// # Returns
/// - 200 OK with the stored document (original content omitted)
/// - 400 Bad Request on missing parts or exceeded limits
/// - 502 Bad Gateway when analysis fails
/// - 503 Service Unavailable when the analyzer is not configured
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("无法解析上传内容: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("未命名文档")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("读取文件失败: {}", e)))?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("user_id") => {
                user_id = field.text().await.ok().filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("文件和用户ID都是必填的".to_string()))?;
    let user_id =
        user_id.ok_or_else(|| ApiError::BadRequest("文件和用户ID都是必填的".to_string()))?;

    let content = String::from_utf8_lossy(&bytes).into_owned();
    validate_upload(bytes.len() as u64, content.chars().count())?;

    let analyzer = state.analyzer()?;
    let analysis = analyzer.analyze_document(&file_name, &content).await?;
    let document = Document::new(user_id.clone(), file_name, bytes.len() as u64, content, analysis);
    let id = state.store.documents.insert(document.clone()).await?;
    info!(document_id = %id, user_id = %user_id, size = document.file_size, "document created");

    mirror_document(&state, &document).await;

    Ok(Json(serde_json::json!({
        "success": true,
        "document": document.summary(),
    })))
}

async fn mirror_document(state: &AppState, document: &Document) {
    let auth = match state.store.notion_auth.get(&document.user_id).await {
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
            .create_page(blocks::document_page_body(&database_id, document))
            .await
    }
    .await;

    match result {
        Ok(page_id) => {
            debug!(document_id = %document.id, page_id = %page_id, "document mirrored to Notion")
        }
        Err(err) => warn!(document_id = %document.id, error = %err, "notion mirror failed"),
    }
}

/// List a user's documents, newest first, without original content.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListDocumentsResponse>, ApiError> {
    let user_id = query
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("用户ID是必填的".to_string()))?;

    let response = state
        .store
        .documents
        .list(ListDocumentsRequest {
            user_id,
            category: parse_category(query.category.as_deref())?,
            page: query.page.unwrap_or(PAGE_FIRST).max(1),
            limit: query.limit.unwrap_or(PAGE_LIMIT),
        })
        .await?;

    Ok(Json(response))
}

/// Fetch a single document, including its original content.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>, ApiError> {
    let document = state.store.documents.fetch(id).await?;
    Ok(Json(document))
}

/// Replace a document's original content.
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let summary = state
        .store
        .documents
        .update_content(id, &req.content)
        .await?;
    info!(document_id = %id, "document updated");
    Ok(Json(serde_json::json!({
        "success": true,
        "document": summary,
    })))
}

/// Delete a document.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.documents.delete(id).await?;
    info!(document_id = %id, "document deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_accepted_at_both_boundaries() {
        assert!(validate_upload(MAX_DOCUMENT_BYTES, MAX_DOCUMENT_CHARS).is_ok());
    }

    #[test]
    fn upload_rejected_over_byte_limit() {
        let err = validate_upload(MAX_DOCUMENT_BYTES + 1, 10).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn upload_rejected_over_char_limit() {
        let err = validate_upload(1024, MAX_DOCUMENT_CHARS + 1).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn small_upload_accepted() {
        assert!(validate_upload(5, 5).is_ok());
    }
}
