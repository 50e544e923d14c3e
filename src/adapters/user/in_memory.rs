//! In-memory user directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::ports::{User, UserRepository, UserRepositoryError};

/// User lookup backed by a map, seeded by tests or at startup.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    /// Builder for tests.
    pub async fn with_user(self, id: &str, username: &str) -> Self {
        if let Ok(id) = UserId::new(id) {
            self.insert(User {
                id,
                username: username.to_string(),
            })
            .await;
        }
        self
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_seeded_user() {
        let repo = InMemoryUserRepository::new().with_user("u1", "alice").await;
        let user = repo.find_by_id(&UserId::new("u1").unwrap()).await.unwrap();
        assert_eq!(user.map(|u| u.username), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn unknown_user_is_none() {
        let repo = InMemoryUserRepository::new();
        assert!(repo
            .find_by_id(&UserId::new("ghost").unwrap())
            .await
            .unwrap()
            .is_none());
    }
}
