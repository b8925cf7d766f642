//! Authentication endpoints
//!
//! Sign-up, sign-in, sign-out and session lookup. A successful sign-up or
//! sign-in sets the HttpOnly session cookie; the token never appears in a
//! response body.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::CurrentSession;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::User;
use crate::infrastructure::identity::{Session, SignUpRequest};

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub company: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User response (safe to expose)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub role: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.email().to_string(),
            full_name: user.full_name().map(str::to_string),
            company: user.company().map(str::to_string),
            role: user.role().as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub expires_at: String,
    pub redirect: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    pub user: Option<UserResponse>,
}

fn session_reply(state: &AppState, status: StatusCode, session: Session) -> Response {
    let cookie = state.session_cookie.issue(&session.token);
    let body = SessionResponse {
        user: UserResponse::from_user(&session.user),
        expires_at: session.expires_at.to_rfc3339(),
        redirect: crate::domain::DASHBOARD_ROUTE,
    };

    (status, AppendHeaders([(header::SET_COOKIE, cookie)]), Json(body)).into_response()
}

/// Create an account and sign straight in
///
/// POST /auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpBody>,
) -> Result<Response, ApiError> {
    let user = state
        .identity
        .sign_up(SignUpRequest {
            email: body.email,
            password: body.password,
            full_name: body.full_name,
            company: body.company,
        })
        .await?;

    let session = state.identity.start_session(user)?;

    Ok(session_reply(&state, StatusCode::CREATED, session))
}

/// Sign in with email and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let session = state
        .identity
        .sign_in_with_password(&request.email, &request.password)
        .await?;

    info!(user_id = %session.user.id(), "User signed in");
    Ok(session_reply(&state, StatusCode::OK, session))
}

/// Sign out and clear the session cookie
///
/// POST /auth/logout
///
/// Tokens are stateless; clearing the cookie ends the browser session.
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    if let Some(user) = session.user() {
        state.identity.sign_out(user);
        info!(user_id = %user.id(), "User signed out");
    }

    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, state.session_cookie.clear())]),
    )
}

/// GET /auth/me
pub async fn get_current_user(CurrentSession(session): CurrentSession) -> Json<MeResponse> {
    Json(MeResponse {
        authenticated: session.is_authenticated(),
        user: session.user().map(UserResponse::from_user),
    })
}
