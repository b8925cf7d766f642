//! Admin report view and CSV export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::auth::UserResponse;
use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::Json;
use crate::domain::registration::{report, Registration};

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct AdminPage<'a> {
    pub user: UserResponse,
    pub query: String,
    pub total: usize,
    pub shown: usize,
    pub rows: Vec<&'a Registration>,
    pub export_url: String,
}

/// GET /admin?q=
pub async fn admin_page(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let rows = state.registrations.load_report(&user).await;
    let filtered = report::filter_by_company(&rows, &query.q);

    let page = AdminPage {
        user: UserResponse::from_user(&user),
        total: rows.len(),
        shown: filtered.len(),
        rows: filtered,
        export_url: export_url(&query.q),
        query: query.q.clone(),
    };

    Json(page).into_response()
}

/// GET /admin/export?q=
///
/// Exports exactly the rows the report shows for the same query.
pub async fn export_csv(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let rows = state.registrations.load_report(&user).await;
    let filtered = report::filter_by_company(&rows, &query.q);
    let filename = report::export_filename(Utc::now().date_naive());

    info!(user_id = %user.id(), rows = filtered.len(), %filename, "Registrations exported");

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        report::export_csv(filtered),
    )
}

fn export_url(query: &str) -> String {
    if query.trim().is_empty() {
        "/admin/export".to_string()
    } else {
        format!("/admin/export?q={}", encode_query_value(query))
    }
}

fn encode_query_value(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}
