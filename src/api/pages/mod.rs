//! Page models
//!
//! Each page is served as JSON describing what the client renders. Protected
//! pages sit behind the [`RequireUser`](crate::api::middleware::RequireUser)
//! and [`RequireAdmin`](crate::api::middleware::RequireAdmin) gates.

pub mod admin;
pub mod dashboard;
pub mod public;
pub mod registration;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

/// Create the page router
pub fn create_pages_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(public::login_page))
        .route("/register", get(public::register_page))
        .route("/dashboard", get(dashboard::dashboard_page))
        .route(
            "/dashboard/registration",
            get(registration::get_form).delete(registration::abandon_form),
        )
        .route("/dashboard/registration/next", post(registration::next_step))
        .route("/dashboard/registration/back", post(registration::previous_step))
        .route("/dashboard/registration/submit", post(registration::submit_form))
        .route("/admin", get(admin::admin_page))
        .route("/admin/export", get(admin::export_csv))
}
