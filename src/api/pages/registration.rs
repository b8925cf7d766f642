//! Registration wizard endpoints
//!
//! Every reply carries the wizard view so the client can re-render the
//! current step with its values and messages.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::registration::{Registration, StepInput};
use crate::domain::DASHBOARD_ROUTE;
use crate::infrastructure::registration::FormReply;

#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    pub registration: Registration,
    pub redirect: &'static str,
}

impl IntoResponse for FormReply {
    fn into_response(self) -> Response {
        match self {
            FormReply::Updated(view) => (StatusCode::OK, Json(view)).into_response(),
            FormReply::Invalid(view) => (StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response(),
            FormReply::Rejected(view) => (StatusCode::CONFLICT, Json(view)).into_response(),
            FormReply::InProgress(view) => (StatusCode::ACCEPTED, Json(view)).into_response(),
            FormReply::Confirmed(registration) => (
                StatusCode::CREATED,
                Json(ConfirmationResponse {
                    registration,
                    redirect: DASHBOARD_ROUTE,
                }),
            )
                .into_response(),
        }
    }
}

/// GET /dashboard/registration
pub async fn get_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> FormReply {
    FormReply::Updated(state.registration_form.view(&user).await)
}

/// POST /dashboard/registration/next
pub async fn next_step(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<StepInput>,
) -> Result<FormReply, ApiError> {
    Ok(state.registration_form.next(&user, &input).await?)
}

/// POST /dashboard/registration/back
pub async fn previous_step(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<FormReply, ApiError> {
    Ok(state.registration_form.back(&user).await?)
}

/// POST /dashboard/registration/submit
pub async fn submit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<StepInput>,
) -> Result<FormReply, ApiError> {
    Ok(state.registration_form.submit(&user, &input).await?)
}

/// DELETE /dashboard/registration
pub async fn abandon_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> StatusCode {
    state.registration_form.abandon(&user).await;
    StatusCode::NO_CONTENT
}
