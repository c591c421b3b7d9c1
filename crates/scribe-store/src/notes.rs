//! In-memory note repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use scribe_core::{Error, ListNotesRequest, ListNotesResponse, Note, NoteRepository, Result};

use crate::paginate;

/// Linear-scan note storage. Lookup, filter, update, and delete all walk the
/// vector; listing sorts by creation time descending before slicing.
#[derive(Default)]
pub struct InMemoryNoteRepository {
    notes: RwLock<Vec<Note>>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn insert(&self, note: Note) -> Result<Uuid> {
        let id = note.id;
        let mut notes = self.notes.write().await;
        notes.push(note);
        debug!(note_id = %id, total = notes.len(), "note inserted");
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        let notes = self.notes.read().await;
        notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or(Error::NoteNotFound(id))
    }

    async fn list(&self, req: ListNotesRequest) -> Result<ListNotesResponse> {
        if req.limit == 0 {
            return Err(Error::InvalidInput("limit must be positive".to_string()));
        }

        let notes = self.notes.read().await;
        let mut matched: Vec<Note> = notes
            .iter()
            .filter(|n| n.user_id == req.user_id)
            .filter(|n| req.category.is_none_or(|c| n.analysis.category == c))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len();
        let (page_items, total_pages) = paginate(&matched, req.page, req.limit);
        debug!(
            user_id = %req.user_id,
            total,
            page = req.page,
            result_count = page_items.len(),
            "notes listed"
        );

        Ok(ListNotesResponse {
            notes: page_items,
            total,
            page: req.page,
            total_pages,
        })
    }

    async fn update_content(&self, id: Uuid, content: &str) -> Result<Note> {
        let mut notes = self.notes.write().await;
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(Error::NoteNotFound(id))?;
        note.original_content = content.to_string();
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(Error::NoteNotFound(id));
        }
        debug!(note_id = %id, "note deleted");
        Ok(())
    }

    async fn list_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Note>> {
        let notes = self.notes.read().await;
        Ok(notes
            .iter()
            .filter(|n| n.user_id == user_id && n.created_at >= start && n.created_at <= end)
            .cloned()
            .collect())
    }
}
