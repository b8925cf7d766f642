//! Registration read paths used by the dashboard and the admin report

use std::sync::Arc;
use tracing::{debug, error};

use crate::domain::registration::{Caller, Registration, RegistrationRepository};
use crate::domain::user::User;
use crate::domain::DomainError;

/// Read-side registration service
///
/// Fetch failures on these paths are logged and treated as "no data" so the
/// page renders its empty state instead of failing.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    repository: Arc<dyn RegistrationRepository>,
}

impl RegistrationService {
    pub fn new(repository: Arc<dyn RegistrationRepository>) -> Self {
        Self { repository }
    }

    /// The signed-in user's own registration, if any
    pub async fn status_for(&self, user: &User) -> Option<Registration> {
        let caller = Caller::from(user);

        match self.repository.find_by_user(&caller, user.id()).await {
            Ok(found) => found,
            Err(e) => {
                error!(user_id = %user.id(), error = %e, "Failed to load registration status");
                None
            }
        }
    }

    /// Every row visible to the caller, newest first
    pub async fn load_report(&self, user: &User) -> Vec<Registration> {
        let caller = Caller::from(user);

        match self.repository.list_all(&caller).await {
            Ok(rows) => {
                debug!(count = rows.len(), "Loaded registrations");
                rows
            }
            Err(e) => {
                error!(user_id = %user.id(), error = %e, "Failed to load registrations");
                Vec::new()
            }
        }
    }

    /// Whether the store answers at all
    pub async fn check_store(&self) -> Result<(), DomainError> {
        self.repository.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::{sample_details, MockRegistrationRepository, NewRegistration};
    use crate::domain::user::{UserId, UserMetadata};
    use chrono::Utc;

    fn user() -> User {
        User::new(UserId::generate(), "jane@acme.com", "hash", UserMetadata::default())
    }

    #[tokio::test]
    async fn test_status_for_registered_user() {
        let repository = Arc::new(MockRegistrationRepository::new());
        let service = RegistrationService::new(repository.clone());
        let user = user();

        assert!(service.status_for(&user).await.is_none());

        let new = NewRegistration::confirmed(*user.id(), sample_details(), Utc::now());
        repository.insert(&Caller::from(&user), new).await.unwrap();

        assert!(service.status_for(&user).await.is_some());
    }

    #[tokio::test]
    async fn test_fetch_failures_degrade_to_no_data() {
        let repository = Arc::new(MockRegistrationRepository::new());
        let service = RegistrationService::new(repository.clone());
        let user = user();

        let new = NewRegistration::confirmed(*user.id(), sample_details(), Utc::now());
        repository.insert(&Caller::from(&user), new).await.unwrap();
        repository.set_should_fail(true).await;

        assert!(service.status_for(&user).await.is_none());
        assert!(service.load_report(&user).await.is_empty());
        assert!(service.check_store().await.is_err());
    }
}
