//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Repository trait for identity storage
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their (lower-cased) email, used for sign-in
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user; fails with a conflict when the email is taken
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Persist metadata changes of an existing user
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Check if an email is already registered
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}
