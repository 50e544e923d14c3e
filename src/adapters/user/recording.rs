//! Session validator that records every authenticated user.
//!
//! The account service is the source of truth for users. Without a shared
//! user store, owners become known to this instance once they authenticate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::{SessionValidator, User};

use super::InMemoryUserRepository;

pub struct RecordingSessionValidator {
    inner: Arc<dyn SessionValidator>,
    users: InMemoryUserRepository,
}

impl RecordingSessionValidator {
    pub fn new(inner: Arc<dyn SessionValidator>, users: InMemoryUserRepository) -> Self {
        Self { inner, users }
    }
}

#[async_trait]
impl SessionValidator for RecordingSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let user = self.inner.validate(token).await?;
        self.users
            .insert(User {
                id: user.id.clone(),
                username: user.username.clone().unwrap_or_default(),
            })
            .await;
        Ok(user)
    }
}
