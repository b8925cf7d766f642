//! Registration store trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewRegistration, Registration};
use super::policy::Caller;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Storage for registrations
///
/// Every method runs as `caller` and only sees rows the caller may read.
/// A second insert for the same user fails with [`DomainError::Conflict`]
/// carrying the store's own message.
#[async_trait]
pub trait RegistrationRepository: Send + Sync + Debug {
    /// Insert one row; the row must belong to the caller
    async fn insert(
        &self,
        caller: &Caller,
        registration: NewRegistration,
    ) -> Result<Registration, DomainError>;

    /// The registration owned by `user_id`, if visible to the caller
    async fn find_by_user(
        &self,
        caller: &Caller,
        user_id: &UserId,
    ) -> Result<Option<Registration>, DomainError>;

    /// All visible rows, newest registration first
    async fn list_all(&self, caller: &Caller) -> Result<Vec<Registration>, DomainError>;

    /// Readiness probe
    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
