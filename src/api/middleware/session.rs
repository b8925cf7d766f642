//! Session resolution and the access gate extractors
//!
//! The session token is read from the session cookie, falling back to
//! `Authorization: Bearer <token>`. Resolution never fails the request:
//! anything that goes wrong is logged and the visitor is anonymous.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::domain::{authorize, Access, Role, SessionContext, User};
use crate::infrastructure::observability::record_gate_redirect;

/// Pull the session token out of the request headers
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    cookie_value(headers, cookie_name).or_else(|| bearer_token(headers))
}

fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolve the request's session once; later extractors reuse it
async fn resolve_session(parts: &mut Parts, state: &AppState) -> SessionContext {
    if let Some(session) = parts.extensions.get::<SessionContext>() {
        return session.clone();
    }

    let session = match extract_session_token(&parts.headers, &state.session_cookie.name) {
        None => SessionContext::anonymous(),
        Some(token) => match state.identity.current_user(&token).await {
            Ok(Some(user)) => SessionContext::authenticated(user),
            Ok(None) => {
                debug!("Session token did not resolve to a user");
                SessionContext::anonymous()
            }
            Err(e) => {
                warn!(error = %e, "Failed to resolve session, continuing as anonymous");
                SessionContext::anonymous()
            }
        },
    };

    parts.extensions.insert(session.clone());
    session
}

/// The resolved session; never rejects
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionContext);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(resolve_session(parts, state).await))
    }
}

/// Gate rejection: a `303 See Other` to the given route
#[derive(Debug, Clone, Copy)]
pub struct GateRedirect(pub &'static str);

impl IntoResponse for GateRedirect {
    fn into_response(self) -> Response {
        record_gate_redirect(self.0);
        Redirect::to(self.0).into_response()
    }
}

async fn gate(
    parts: &mut Parts,
    state: &AppState,
    required_role: Option<Role>,
) -> Result<User, GateRedirect> {
    let session = resolve_session(parts, state).await;

    match authorize(&session, required_role) {
        Access::Granted(user) => Ok(user),
        Access::Redirect(target) => {
            debug!(path = %parts.uri.path(), redirect = target, "Access gate redirect");
            Err(GateRedirect(target))
        }
    }
}

/// Any signed-in user; anonymous visitors go to `/login`
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = GateRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, None).await.map(RequireUser)
    }
}

/// Admins only; other signed-in users go to `/dashboard`
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = GateRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, Some(Role::Admin)).await.map(RequireAdmin)
    }
}
