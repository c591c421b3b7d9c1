//! In-memory Notion credential repository.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use scribe_core::{NotionAuth, NotionAuthRepository, Result};

/// Per-user Notion credentials, keyed by opaque user id. Upsert replaces the
/// previous credential; a workspace re-auth invalidates the old token anyway.
#[derive(Default)]
pub struct InMemoryNotionAuthRepository {
    auths: RwLock<Vec<NotionAuth>>,
}

impl InMemoryNotionAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotionAuthRepository for InMemoryNotionAuthRepository {
    async fn upsert(&self, auth: NotionAuth) -> Result<()> {
        let mut auths = self.auths.write().await;
        auths.retain(|a| a.user_id != auth.user_id);
        debug!(user_id = %auth.user_id, "notion credential saved");
        auths.push(auth);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<NotionAuth>> {
        let auths = self.auths.read().await;
        Ok(auths.iter().find(|a| a.user_id == user_id).cloned())
    }
}
