//! In-memory user store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    /// email -> user id
    email_index: Arc<RwLock<HashMap<String, UserId>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email_index = self.email_index.read().await;

        if let Some(user_id) = email_index.get(&email.to_lowercase()) {
            return Ok(self.users.read().await.get(user_id).cloned());
        }

        Ok(None)
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        if email_index.contains_key(user.email()) {
            return Err(DomainError::conflict("User already registered"));
        }

        email_index.insert(user.email().to_string(), *user.id());
        users.insert(*user.id(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        match users.get_mut(user.id()) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user.clone())
            }
            None => Err(DomainError::not_found(format!("User '{}' not found", user.id()))),
        }
    }
}
