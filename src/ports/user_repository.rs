//! User lookup port.
//!
//! Account management lives elsewhere; pairing only needs to know that an
//! owner exists.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserId;

/// The parts of a user account this service reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns `Ok(None)` when no account has this id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserRepositoryError {
    #[error("storage failure: {0}")]
    Storage(String),
}
