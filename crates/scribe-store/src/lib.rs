//! # scribe-store
//!
//! In-memory repository implementations for scribe.
//!
//! This is explicitly the persistence stand-in the repository traits exist
//! for: flat `RwLock`-guarded vectors scanned linearly, with no durability.
//! Data does not survive a restart. A real database backend would replace
//! this crate without touching the API layer.

pub mod documents;
pub mod notes;
pub mod notion_auth;
pub mod users;

use std::sync::Arc;

use scribe_core::{DocumentRepository, NoteRepository, NotionAuthRepository, UserRepository};

pub use documents::InMemoryDocumentRepository;
pub use notes::InMemoryNoteRepository;
pub use notion_auth::InMemoryNotionAuthRepository;
pub use users::InMemoryUserRepository;

/// Bundle of repositories handed to the API layer.
#[derive(Clone)]
pub struct Store {
    pub notes: Arc<dyn NoteRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub notion_auth: Arc<dyn NotionAuthRepository>,
}

impl Store {
    /// Create a store backed entirely by process-local memory.
    pub fn in_memory() -> Self {
        Self {
            notes: Arc::new(InMemoryNoteRepository::new()),
            documents: Arc::new(InMemoryDocumentRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            notion_auth: Arc::new(InMemoryNotionAuthRepository::new()),
        }
    }
}

/// Offset/limit slice over an already filtered and sorted set.
///
/// `page` is 1-based; `total_pages` is the ceiling of `total / limit`.
pub(crate) fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let total_pages = total.div_ceil(limit);
    let start = (page.max(1) - 1).saturating_mul(limit);
    let slice = items
        .iter()
        .skip(start)
        .take(limit)
        .cloned()
        .collect::<Vec<_>>();
    (slice, total_pages)
}
