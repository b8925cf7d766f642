//! Identity gateway: sign-up, sign-in, session resolution and role administration

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::domain::user::{
    validate_email, validate_password, validate_profile, Role, User, UserId, UserMetadata,
    UserRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::auth::JwtGenerator;

use super::events::{SessionEvent, SESSION_EVENT_CAPACITY};
use super::password::PasswordHasher;

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Request for creating a new account
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub company: String,
}

/// An issued session
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    #[serde(skip_serializing)]
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

/// Identity service backed by a user store, a password hasher and a token issuer
#[derive(Debug)]
pub struct IdentityService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<dyn JwtGenerator>,
    events: broadcast::Sender<SessionEvent>,
}

impl<R: UserRepository, H: PasswordHasher> IdentityService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<dyn JwtGenerator>) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);

        Self {
            repository,
            hasher,
            tokens,
            events,
        }
    }

    /// Listen for session changes
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // No listeners is fine
        let _ = self.events.send(event);
    }

    /// Create an account; metadata gets `full_name` and `company` only
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<User, DomainError> {
        validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_profile(&request.full_name, &request.company)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.email_exists(&request.email.to_lowercase()).await? {
            return Err(DomainError::conflict("User already registered"));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let metadata = UserMetadata::profile(request.full_name.trim(), request.company.trim());
        let user = User::new(UserId::generate(), &request.email, password_hash, metadata);

        let user = self.repository.create(user).await?;

        info!(user_id = %user.id(), "User signed up");
        self.publish(SessionEvent::SignedUp { user_id: *user.id() });

        Ok(user)
    }

    /// Verify credentials and issue a session
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DomainError> {
        let user = self
            .repository
            .get_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(|| DomainError::unauthorized(INVALID_CREDENTIALS))?;

        if !self.hasher.verify(password, user.password_hash()) {
            debug!(user_id = %user.id(), "Password mismatch");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }

        self.start_session(user)
    }

    /// Issue a session for an already verified user
    pub fn start_session(&self, user: User) -> Result<Session, DomainError> {
        let (token, claims) = self.tokens.generate(&user)?;

        self.publish(SessionEvent::SignedIn { user_id: *user.id() });

        Ok(Session {
            token,
            expires_at: claims.expires_at(),
            user,
        })
    }

    /// End a session. Tokens are stateless, so this only notifies listeners.
    pub fn sign_out(&self, user: &User) {
        self.publish(SessionEvent::SignedOut { user_id: *user.id() });
    }

    /// Resolve a session token to its user
    ///
    /// Invalid, expired or orphaned tokens resolve to `None`; only store
    /// failures are errors.
    pub async fn current_user(&self, token: &str) -> Result<Option<User>, DomainError> {
        let claims = match self.tokens.validate(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Rejected session token");
                return Ok(None);
            }
        };

        let Ok(user_id) = claims.user_id() else {
            return Ok(None);
        };

        self.repository.get(&user_id).await
    }

    /// Set a user's role (identity administration)
    pub async fn grant_role(&self, email: &str, role: Role) -> Result<User, DomainError> {
        let mut user = self
            .repository
            .get_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", email)))?;

        user.set_role(role);
        let user = self.repository.update(&user).await?;

        info!(user_id = %user.id(), role = %role, "Role granted");
        Ok(user)
    }
}
