//! Core traits for scribe abstractions.
//!
//! Repository traits are the explicit persistence seam: handlers only ever
//! see these interfaces, so the in-memory stand-in can be swapped for a real
//! database without touching the API layer.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Request for listing notes.
#[derive(Debug, Clone)]
pub struct ListNotesRequest {
    pub user_id: String,
    /// None means all categories.
    pub category: Option<Category>,
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
}

/// Response for listing notes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ListNotesResponse {
    pub notes: Vec<Note>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Repository for note CRUD operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note.
    async fn insert(&self, note: Note) -> Result<Uuid>;

    /// Fetch a note by ID.
    async fn fetch(&self, id: Uuid) -> Result<Note>;

    /// List a user's notes, newest first, filtered and paginated.
    async fn list(&self, req: ListNotesRequest) -> Result<ListNotesResponse>;

    /// Replace the original content, bumping `updated_at`.
    async fn update_content(&self, id: Uuid, content: &str) -> Result<Note>;

    /// Delete a note.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// All notes a user created inside the given UTC window.
    async fn list_in_range(
        &self,
        user_id: &str,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Note>>;
}

// =============================================================================
// DOCUMENT REPOSITORY
// =============================================================================

/// Request for listing documents.
#[derive(Debug, Clone)]
pub struct ListDocumentsRequest {
    pub user_id: String,
    pub category: Option<Category>,
    pub page: usize,
    pub limit: usize,
}

/// Response for listing documents. Original content is never included.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ListDocumentsResponse {
    pub documents: Vec<DocumentSummary>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Repository for document CRUD operations.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, document: Document) -> Result<Uuid>;

    /// Fetch a full document (including original content) by ID.
    async fn fetch(&self, id: Uuid) -> Result<Document>;

    async fn list(&self, req: ListDocumentsRequest) -> Result<ListDocumentsResponse>;

    /// Replace the original content, bumping `updated_at`.
    async fn update_content(&self, id: Uuid, content: &str) -> Result<DocumentSummary>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// All documents a user created inside the given UTC window.
    async fn list_in_range(
        &self,
        user_id: &str,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Document>>;
}

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `InvalidInput` if the email is taken.
    async fn insert(&self, user: User) -> Result<Uuid>;

    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Fetch a user by ID.
    async fn fetch(&self, id: Uuid) -> Result<User>;
}

// =============================================================================
// NOTION AUTH REPOSITORY
// =============================================================================

/// Repository for per-user Notion credentials.
#[async_trait]
pub trait NotionAuthRepository: Send + Sync {
    /// Insert or replace the credential for a user.
    async fn upsert(&self, auth: NotionAuth) -> Result<()>;

    /// Look up a user's credential.
    async fn get(&self, user_id: &str) -> Result<Option<NotionAuth>>;
}

// =============================================================================
// INFERENCE
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
