//! Public pages: login and registration

use serde::Serialize;

use crate::api::auth::UserResponse;
use crate::api::middleware::CurrentSession;
use crate::api::types::Json;

#[derive(Debug, Serialize)]
pub struct PublicPage {
    pub page: &'static str,
    pub action: &'static str,
    pub fields: &'static [&'static str],
    /// Set when the visitor is already signed in
    pub session: Option<UserResponse>,
}

/// GET /login
pub async fn login_page(CurrentSession(session): CurrentSession) -> Json<PublicPage> {
    Json(PublicPage {
        page: "login",
        action: "/auth/login",
        fields: &["email", "password"],
        session: session.user().map(UserResponse::from_user),
    })
}

/// GET /register
pub async fn register_page(CurrentSession(session): CurrentSession) -> Json<PublicPage> {
    Json(PublicPage {
        page: "register",
        action: "/auth/signup",
        fields: &["full_name", "company", "email", "password"],
        session: session.user().map(UserResponse::from_user),
    })
}
