//! In-memory document repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use scribe_core::{
    Document, DocumentRepository, DocumentSummary, Error, ListDocumentsRequest,
    ListDocumentsResponse, Result,
};

use crate::paginate;

/// Linear-scan document storage, mirroring [`crate::InMemoryNoteRepository`].
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, document: Document) -> Result<Uuid> {
        let id = document.id;
        let mut documents = self.documents.write().await;
        documents.push(document);
        debug!(document_id = %id, total = documents.len(), "document inserted");
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Document> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(Error::DocumentNotFound(id))
    }

    async fn list(&self, req: ListDocumentsRequest) -> Result<ListDocumentsResponse> {
        if req.limit == 0 {
            return Err(Error::InvalidInput("limit must be positive".to_string()));
        }

        let documents = self.documents.read().await;
        let mut matched: Vec<DocumentSummary> = documents
            .iter()
            .filter(|d| d.user_id == req.user_id)
            .filter(|d| req.category.is_none_or(|c| d.analysis.category == c))
            .map(Document::summary)
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len();
        let (page_items, total_pages) = paginate(&matched, req.page, req.limit);

        Ok(ListDocumentsResponse {
            documents: page_items,
            total,
            page: req.page,
            total_pages,
        })
    }

    async fn update_content(&self, id: Uuid, content: &str) -> Result<DocumentSummary> {
        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Error::DocumentNotFound(id))?;
        document.original_content = content.to_string();
        document.updated_at = Utc::now();
        Ok(document.summary())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Err(Error::DocumentNotFound(id));
        }
        debug!(document_id = %id, "document deleted");
        Ok(())
    }

    async fn list_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.user_id == user_id && d.created_at >= start && d.created_at <= end)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::{Category, DocumentAnalysis};

    fn document(user: &str) -> Document {
        Document::new(
            user.to_string(),
            "plan.md".to_string(),
            1024,
            "完整文本".to_string(),
            DocumentAnalysis {
                title: "方案".to_string(),
                summary: "摘要".to_string(),
                category: Category::Work,
                tags: vec!["计划".into()],
                key_points: vec!["要点".into()],
                action_items: vec![],
                document_type: "方案".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn list_omits_original_content() {
        let repo = InMemoryDocumentRepository::new();
        repo.insert(document("u1")).await.unwrap();

        let listed = repo
            .list(ListDocumentsRequest {
                user_id: "u1".to_string(),
                category: None,
                page: 1,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(listed.total, 1);

        let json = serde_json::to_value(&listed.documents[0]).unwrap();
        assert!(json.get("original_content").is_none());
    }

    #[tokio::test]
    async fn fetch_returns_full_content() {
        let repo = InMemoryDocumentRepository::new();
        let id = repo.insert(document("u1")).await.unwrap();
        let fetched = repo.fetch(id).await.unwrap();
        assert_eq!(fetched.original_content, "完整文本");
    }

    #[tokio::test]
    async fn update_content_returns_summary() {
        let repo = InMemoryDocumentRepository::new();
        let id = repo.insert(document("u1")).await.unwrap();
        let summary = repo.update_content(id, "改过的文本").await.unwrap();
        assert_eq!(summary.file_name, "plan.md");

        let full = repo.fetch(id).await.unwrap();
        assert_eq!(full.original_content, "改过的文本");
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = InMemoryDocumentRepository::new();
        assert!(matches!(
            repo.delete(Uuid::nil()).await.unwrap_err(),
            Error::DocumentNotFound(_)
        ));
    }
}
