//! In-memory registration store

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::registration::{
    Caller, NewRegistration, Registration, RegistrationId, RegistrationRepository,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Messages match what PostgreSQL reports so both stores surface the same text
pub(crate) const UNIQUE_USER_VIOLATION: &str =
    "duplicate key value violates unique constraint \"registrations_user_id_key\"";
pub(crate) const INSERT_POLICY_VIOLATION: &str =
    "new row violates row-level security policy for table \"registrations\"";

/// In-memory store keyed by owning user, enforcing the same policy as the database
#[derive(Debug, Default)]
pub struct InMemoryRegistrationRepository {
    rows: Arc<RwLock<HashMap<UserId, Registration>>>,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn insert(
        &self,
        caller: &Caller,
        registration: NewRegistration,
    ) -> Result<Registration, DomainError> {
        if !caller.can_insert(&registration.user_id) {
            return Err(DomainError::forbidden(INSERT_POLICY_VIOLATION));
        }

        let mut rows = self.rows.write().await;

        if rows.contains_key(&registration.user_id) {
            return Err(DomainError::conflict(UNIQUE_USER_VIOLATION));
        }

        let row = Registration::from_new(RegistrationId::generate(), registration, Utc::now());
        rows.insert(*row.user_id(), row.clone());

        Ok(row)
    }

    async fn find_by_user(
        &self,
        caller: &Caller,
        user_id: &UserId,
    ) -> Result<Option<Registration>, DomainError> {
        if !caller.can_read(user_id) {
            return Ok(None);
        }

        Ok(self.rows.read().await.get(user_id).cloned())
    }

    async fn list_all(&self, caller: &Caller) -> Result<Vec<Registration>, DomainError> {
        let rows = self.rows.read().await;

        let mut visible: Vec<Registration> = rows
            .values()
            .filter(|row| caller.can_read(row.user_id()))
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.registration_date().cmp(&a.registration_date()));

        Ok(visible)
    }
}
