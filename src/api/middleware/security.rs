//! Security headers and request screening

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Maximum accepted request body (64 KB); form posts are tiny
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Add security headers to every response
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    // Page models carry personal data
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        );
    }

    response
}

/// Reject suspicious paths before routing
pub async fn request_screening_middleware(request: Request<Body>, next: Next) -> Response {
    if let Err(e) = validate_request_path(request.uri().path()) {
        return e.into_response();
    }

    next.run(request).await
}

/// Validate a request path for traversal and injection attempts
pub fn validate_request_path(path: &str) -> Result<(), SecurityValidationError> {
    if path.contains("..") || path.contains("//") {
        return Err(SecurityValidationError::PathTraversal);
    }

    if path.contains('\0') {
        return Err(SecurityValidationError::InvalidCharacters);
    }

    Ok(())
}

/// Security validation error
#[derive(Debug)]
pub enum SecurityValidationError {
    PathTraversal,
    InvalidCharacters,
}

impl IntoResponse for SecurityValidationError {
    fn into_response(self) -> Response {
        let message = match self {
            SecurityValidationError::PathTraversal => "Invalid path: path traversal detected",
            SecurityValidationError::InvalidCharacters => {
                "Invalid request: prohibited characters"
            }
        };

        let body = serde_json::json!({
            "error": {
                "message": message,
                "type": "invalid_request_error",
            }
        });

        (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_request_path_ok() {
        assert!(validate_request_path("/dashboard/registration/next").is_ok());
        assert!(validate_request_path("/admin/export").is_ok());
    }

    #[test]
    fn test_validate_request_path_traversal() {
        let result = validate_request_path("/dashboard/../admin");
        assert!(matches!(result, Err(SecurityValidationError::PathTraversal)));

        let result = validate_request_path("/admin//export");
        assert!(matches!(result, Err(SecurityValidationError::PathTraversal)));
    }

    #[test]
    fn test_validate_request_path_null_byte() {
        let result = validate_request_path("/admin\0");
        assert!(matches!(
            result,
            Err(SecurityValidationError::InvalidCharacters)
        ));
    }

    #[test]
    fn test_rejection_is_bad_request() {
        let response = SecurityValidationError::PathTraversal.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
