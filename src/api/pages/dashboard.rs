//! User dashboard

use axum::extract::State;
use serde::Serialize;

use crate::api::auth::UserResponse;
use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::Json;
use crate::domain::registration::{Registration, WizardView};

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub user: UserResponse,
    #[serde(flatten)]
    pub content: DashboardContent,
}

/// Exactly one of the status card or the form is shown
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardContent {
    StatusCard { registration: Registration },
    RegistrationForm { form: WizardView },
}

/// GET /dashboard
///
/// A failed status lookup renders the form, never an error.
pub async fn dashboard_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Json<DashboardPage> {
    let content = match state.registrations.status_for(&user).await {
        Some(registration) => DashboardContent::StatusCard { registration },
        None => DashboardContent::RegistrationForm {
            form: state.registration_form.view(&user).await,
        },
    };

    Json(DashboardPage {
        user: UserResponse::from_user(&user),
        content,
    })
}
