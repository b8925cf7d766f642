//! Application state for shared services

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::{DomainError, Role, User, UserRepository};
use crate::infrastructure::identity::{
    IdentityService, PasswordHasher, Session, SessionEvent, SignUpRequest,
};
use crate::infrastructure::registration::{RegistrationFormService, RegistrationService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityServiceTrait>,
    pub registrations: RegistrationService,
    pub registration_form: RegistrationFormService,
    pub session_cookie: SessionCookie,
}

/// How the session cookie is issued
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
    pub max_age_secs: i64,
}

impl SessionCookie {
    /// `Set-Cookie` value carrying a session token
    pub fn issue(&self, token: &str) -> String {
        self.render(token, self.max_age_secs)
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Trait for identity gateway operations
#[async_trait::async_trait]
pub trait IdentityServiceTrait: Send + Sync {
    async fn sign_up(&self, request: SignUpRequest) -> Result<User, DomainError>;
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DomainError>;
    fn start_session(&self, user: User) -> Result<Session, DomainError>;
    fn sign_out(&self, user: &User);
    async fn current_user(&self, token: &str) -> Result<Option<User>, DomainError>;
    async fn grant_role(&self, email: &str, role: Role) -> Result<User, DomainError>;
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

#[async_trait::async_trait]
impl<R, H> IdentityServiceTrait for IdentityService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn sign_up(&self, request: SignUpRequest) -> Result<User, DomainError> {
        IdentityService::sign_up(self, request).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DomainError> {
        IdentityService::sign_in_with_password(self, email, password).await
    }

    fn start_session(&self, user: User) -> Result<Session, DomainError> {
        IdentityService::start_session(self, user)
    }

    fn sign_out(&self, user: &User) {
        IdentityService::sign_out(self, user)
    }

    async fn current_user(&self, token: &str) -> Result<Option<User>, DomainError> {
        IdentityService::current_user(self, token).await
    }

    async fn grant_role(&self, email: &str, role: Role) -> Result<User, DomainError> {
        IdentityService::grant_role(self, email, role).await
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        IdentityService::subscribe(self)
    }
}
