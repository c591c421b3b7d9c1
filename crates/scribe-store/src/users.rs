//! In-memory user repository.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use scribe_core::{Error, Result, User, UserRepository};

/// Linear-scan user storage. Email uniqueness is the only constraint
/// enforced beyond id equality.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<Uuid> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(Error::InvalidInput("用户已存在".to_string()));
        }
        let id = user.id;
        users.push(user);
        debug!(user_id = %id, total = users.len(), "user registered");
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn fetch(&self, id: Uuid) -> Result<User> {
        let users = self.users.read().await;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }
}
