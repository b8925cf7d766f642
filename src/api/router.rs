use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::auth;
use super::health;
use super::middleware::{
    logging_middleware, metrics_middleware, request_screening_middleware,
    security_headers_middleware, MAX_BODY_SIZE,
};
use super::pages;
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Probes
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Sign-up, sign-in, sign-out
        .nest("/auth", auth::create_auth_router())
        // Public and gated pages
        .merge(pages::create_pages_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_screening_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Full router plus the Prometheus scrape endpoint when metrics are enabled
pub fn create_router(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = create_router_with_state(state);

    match metrics {
        Some(m) => router.merge(create_metrics_router(m, metrics_path)),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, Bytes};
    use axum::http::{header, HeaderMap, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::domain::registration::report::CSV_HEADER;
    use crate::domain::{
        Caller, NewRegistration, RegistrationDetails, RegistrationRepository, Role, TshirtSize,
        User,
    };
    use crate::infrastructure::identity::SignUpRequest;
    use crate::infrastructure::registration::in_memory::UNIQUE_USER_VIOLATION;
    use crate::infrastructure::registration::InMemoryRegistrationRepository;

    struct Harness {
        state: AppState,
        store: Arc<InMemoryRegistrationRepository>,
    }

    impl Harness {
        fn new() -> Self {
            let store = Arc::new(InMemoryRegistrationRepository::new());
            let state = crate::create_test_state(store.clone());
            Self { state, store }
        }

        async fn sign_up(&self, email: &str, company: &str) -> (User, String) {
            let user = self
                .state
                .identity
                .sign_up(SignUpRequest {
                    email: email.to_string(),
                    password: "correct-horse-battery".to_string(),
                    full_name: "Jane Doe".to_string(),
                    company: company.to_string(),
                })
                .await
                .unwrap();
            let session = self.state.identity.start_session(user.clone()).unwrap();

            (user, format!("session={}", session.token))
        }

        async fn sign_up_admin(&self, email: &str) -> String {
            self.sign_up(email, "Acme").await;
            let admin = self.state.identity.grant_role(email, Role::Admin).await.unwrap();
            let session = self.state.identity.start_session(admin).unwrap();
            format!("session={}", session.token)
        }

        async fn register_directly(&self, user: &User, company: &str) {
            self.register_as(user, "Jane Doe", company, chrono::Utc::now()).await;
        }

        async fn register_as(
            &self,
            user: &User,
            full_name: &str,
            company: &str,
            date: chrono::DateTime<chrono::Utc>,
        ) {
            let details = RegistrationDetails {
                full_name: full_name.to_string(),
                corporate_email: user.email().to_string(),
                employee_id: "E-1".to_string(),
                company_name: company.to_string(),
                tshirt_size: TshirtSize::Medium,
                emergency_contact: "John Doe".to_string(),
                emergency_phone: "5551234567".to_string(),
            };
            let new = NewRegistration::confirmed(*user.id(), details, date);
            self.store.insert(&Caller::from(user), new).await.unwrap();
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            cookie: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, HeaderMap, Bytes) {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(cookie) = cookie {
                request = request.header(header::COOKIE, cookie);
            }
            let request = match body {
                Some(body) => request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => request.body(Body::empty()).unwrap(),
            };

            let response = create_router_with_state(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.into_body().collect().await.unwrap().to_bytes();
            (status, headers, body)
        }

        async fn send_json(
            &self,
            method: Method,
            uri: &str,
            cookie: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let (status, _, bytes) = self.send(method, uri, cookie, body).await;
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn walk_to_final_step(&self, cookie: &str) {
            let (status, view) = self
                .send_json(
                    Method::POST,
                    "/dashboard/registration/next",
                    Some(cookie),
                    Some(json!({
                        "full_name": "Jane Doe",
                        "corporate_email": "jane@acme.com",
                        "employee_id": "E-1"
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(view["step_number"], 2);

            let (status, view) = self
                .send_json(
                    Method::POST,
                    "/dashboard/registration/next",
                    Some(cookie),
                    Some(json!({ "company_name": "Acme" })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(view["step_number"], 3);
        }
    }

    fn final_step() -> Value {
        json!({
            "tshirt_size": "M",
            "emergency_contact": "John Doe",
            "emergency_phone": "5551234567"
        })
    }

    fn location(headers: &HeaderMap) -> &str {
        headers.get(header::LOCATION).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let harness = Harness::new();

        let (status, _) = harness.send_json(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = harness.send_json(Method::GET, "/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "registration_store");
    }

    #[tokio::test]
    async fn test_anonymous_visitors_are_sent_to_login() {
        let harness = Harness::new();

        for uri in ["/dashboard", "/dashboard/registration", "/admin", "/admin/export"] {
            let (status, headers, _) = harness.send(Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&headers), "/login", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_bad_token_is_anonymous() {
        let harness = Harness::new();

        let (status, headers, _) = harness
            .send(Method::GET, "/dashboard", Some("session=not-a-jwt"), None)
            .await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location(&headers), "/login");
    }

    #[tokio::test]
    async fn test_non_admin_is_sent_to_dashboard() {
        let harness = Harness::new();
        let (_, cookie) = harness.sign_up("jane@acme.com", "Acme").await;

        for uri in ["/admin", "/admin/export?q=acme"] {
            let (status, headers, _) = harness.send(Method::GET, uri, Some(&cookie), None).await;
            assert_eq!(status, StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&headers), "/dashboard", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_signup_sets_session_cookie() {
        let harness = Harness::new();

        let (status, headers, body) = harness
            .send(
                Method::POST,
                "/auth/signup",
                None,
                Some(json!({
                    "email": "new@acme.com",
                    "password": "correct-horse-battery",
                    "full_name": "New Runner",
                    "company": "Acme"
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("HttpOnly"));

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["user"]["role"], "user");
        assert_eq!(body["user"]["company"], "Acme");
        assert!(body.get("token").is_none());

        let session = cookie.split(';').next().unwrap();
        let (status, _, _) = harness.send(Method::GET, "/dashboard", Some(session), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let harness = Harness::new();
        harness.sign_up("jane@acme.com", "Acme").await;

        let (status, body) = harness
            .send_json(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": "jane@acme.com", "password": "wrong-password" })),
            )
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let harness = Harness::new();
        let (_, cookie) = harness.sign_up("jane@acme.com", "Acme").await;

        let (status, headers, _) = harness
            .send(Method::POST, "/auth/logout", Some(&cookie), None)
            .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        let cleared = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cleared.starts_with("session=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_me_reports_session() {
        let harness = Harness::new();
        let (user, cookie) = harness.sign_up("jane@acme.com", "Acme").await;

        let (_, anonymous) = harness.send_json(Method::GET, "/auth/me", None, None).await;
        assert_eq!(anonymous["authenticated"], false);

        let (_, me) = harness.send_json(Method::GET, "/auth/me", Some(&cookie), None).await;
        assert_eq!(me["authenticated"], true);
        assert_eq!(me["user"]["id"], user.id().to_string());
    }

    #[tokio::test]
    async fn test_dashboard_shows_form_until_registered() {
        let harness = Harness::new();
        let (user, cookie) = harness.sign_up("jane@acme.com", "Acme").await;

        let (status, page) = harness
            .send_json(Method::GET, "/dashboard", Some(&cookie), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["view"], "registration_form");
        assert_eq!(page["form"]["step"], "personal_info");
        assert!(page.get("registration").is_none());

        harness.register_directly(&user, "Acme").await;

        let (_, page) = harness
            .send_json(Method::GET, "/dashboard", Some(&cookie), None)
            .await;
        assert_eq!(page["view"], "status_card");
        assert_eq!(page["registration"]["company_name"], "Acme");
        assert_eq!(page["registration"]["status"], "confirmed");
        assert!(page.get("form").is_none());
    }

    #[tokio::test]
    async fn test_invalid_step_stays_put() {
        let harness = Harness::new();
        let (_, cookie) = harness.sign_up("jane@acme.com", "Acme").await;

        let (status, view) = harness
            .send_json(
                Method::POST,
                "/dashboard/registration/next",
                Some(&cookie),
                Some(json!({
                    "full_name": "J",
                    "corporate_email": "not-an-email",
                    "employee_id": ""
                })),
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(view["step_number"], 1);
        assert_eq!(
            view["errors"]["full_name"],
            "Full name must be at least 2 characters"
        );
        assert_eq!(
            view["errors"]["corporate_email"],
            "Please enter a valid email address"
        );
        assert_eq!(view["errors"]["employee_id"], "Employee ID is required");
    }

    #[tokio::test]
    async fn test_back_keeps_values() {
        let harness = Harness::new();
        let (_, cookie) = harness.sign_up("jane@acme.com", "Acme").await;
        harness.walk_to_final_step(&cookie).await;

        let (status, view) = harness
            .send_json(Method::POST, "/dashboard/registration/back", Some(&cookie), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["step_number"], 2);
        assert_eq!(view["values"]["full_name"], "Jane Doe");
        assert_eq!(view["values"]["company_name"], "Acme");
    }

    #[tokio::test]
    async fn test_submit_before_final_step_is_rejected() {
        let harness = Harness::new();
        let (_, cookie) = harness.sign_up("jane@acme.com", "Acme").await;

        let (status, _) = harness
            .send_json(
                Method::POST,
                "/dashboard/registration/submit",
                Some(&cookie),
                Some(final_step()),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(harness.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_full_registration_flow() {
        let harness = Harness::new();
        let (user, cookie) = harness.sign_up("jane@acme.com", "Acme").await;
        harness.walk_to_final_step(&cookie).await;

        let (status, body) = harness
            .send_json(
                Method::POST,
                "/dashboard/registration/submit",
                Some(&cookie),
                Some(final_step()),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["redirect"], "/dashboard");
        assert_eq!(body["registration"]["user_id"], user.id().to_string());
        assert_eq!(body["registration"]["tshirt_size"], "M");
        assert_eq!(body["registration"]["status"], "confirmed");

        let (_, page) = harness
            .send_json(Method::GET, "/dashboard", Some(&cookie), None)
            .await;
        assert_eq!(page["view"], "status_card");
    }

    #[tokio::test]
    async fn test_duplicate_registration_surfaces_store_message() {
        let harness = Harness::new();
        let (user, cookie) = harness.sign_up("jane@acme.com", "Acme").await;
        harness.register_directly(&user, "Acme").await;

        harness.walk_to_final_step(&cookie).await;
        let (status, view) = harness
            .send_json(
                Method::POST,
                "/dashboard/registration/submit",
                Some(&cookie),
                Some(final_step()),
            )
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(view["form_error"], UNIQUE_USER_VIOLATION);
        assert_eq!(view["step_number"], 3);
        assert_eq!(view["submitting"], false);

        let (_, page) = harness
            .send_json(Method::GET, "/dashboard", Some(&cookie), None)
            .await;
        assert_eq!(page["registration"]["company_name"], "Acme");
    }

    #[tokio::test]
    async fn test_abandon_discards_draft() {
        let harness = Harness::new();
        let (_, cookie) = harness.sign_up("jane@acme.com", "Acme").await;
        harness.walk_to_final_step(&cookie).await;

        let (status, _, _) = harness
            .send(Method::DELETE, "/dashboard/registration", Some(&cookie), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, view) = harness
            .send_json(Method::GET, "/dashboard/registration", Some(&cookie), None)
            .await;
        assert_eq!(view["step_number"], 1);
        assert_eq!(view["values"]["full_name"], "");
    }

    #[tokio::test]
    async fn test_admin_report_filters_by_company() {
        let harness = Harness::new();
        let (jane, _) = harness.sign_up("jane@acme.com", "Acme").await;
        let (bob, _) = harness.sign_up("bob@beta.io", "Beta").await;
        harness.register_directly(&jane, "Acme").await;
        harness.register_directly(&bob, "Beta").await;
        let admin = harness.sign_up_admin("ops@acme.com").await;

        let (status, page) = harness
            .send_json(Method::GET, "/admin", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 2);
        assert_eq!(page["shown"], 2);

        let (_, page) = harness
            .send_json(Method::GET, "/admin?q=BETA", Some(&admin), None)
            .await;
        assert_eq!(page["total"], 2);
        assert_eq!(page["shown"], 1);
        assert_eq!(page["rows"][0]["company_name"], "Beta");
        assert_eq!(page["export_url"], "/admin/export?q=BETA");
    }

    #[tokio::test]
    async fn test_csv_export_download() {
        let harness = Harness::new();
        let (jane, _) = harness.sign_up("jane@acme.com", "Acme").await;
        let (bob, _) = harness.sign_up("bob@beta.io", "Beta").await;
        let (carol, _) = harness.sign_up("carol@acmelabs.com", "ACME Labs").await;
        let now = chrono::Utc::now();
        harness
            .register_as(&carol, "Carol King", "ACME Labs", now - chrono::Duration::days(2))
            .await;
        harness
            .register_as(&bob, "Bob Stone", "Beta", now - chrono::Duration::days(1))
            .await;
        harness.register_as(&jane, "Jane Doe", "Acme", now).await;
        let admin = harness.sign_up_admin("ops@acme.com").await;

        let (status, headers, body) = harness
            .send(Method::GET, "/admin/export?q=acme", Some(&admin), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/csv"));

        let disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("attachment; filename=\"registrations_"));
        assert!(disposition.ends_with(".csv\""));

        let csv = String::from_utf8(body.to_vec()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("\"Jane Doe\","));
        assert!(lines[1].contains("\"jane@acme.com\""));
        assert!(lines[2].starts_with("\"Carol King\","));
        assert!(!csv.contains("Bob Stone"));
    }

    #[tokio::test]
    async fn test_failing_store_renders_empty_pages() {
        use crate::domain::registration::MockRegistrationRepository;

        let store = Arc::new(MockRegistrationRepository::new());
        store.set_should_fail(true).await;
        let state = crate::create_test_state(store);

        state
            .identity
            .sign_up(SignUpRequest {
                email: "ops@acme.com".to_string(),
                password: "correct-horse-battery".to_string(),
                full_name: "Ops".to_string(),
                company: "Acme".to_string(),
            })
            .await
            .unwrap();
        let admin = state.identity.grant_role("ops@acme.com", Role::Admin).await.unwrap();
        let token = state.identity.start_session(admin).unwrap().token;

        let request = Request::builder()
            .uri("/admin")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = create_router_with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let page: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(page["total"], 0);

        let request = Request::builder()
            .uri("/ready")
            .body(Body::empty())
            .unwrap();
        let response = create_router_with_state(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_response_headers() {
        let harness = Harness::new();

        let (_, headers, _) = harness.send(Method::GET, "/login", None, None).await;

        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert!(headers.contains_key("x-request-id"));
    }
}
