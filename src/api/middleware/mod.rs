//! API middleware components

pub mod logging;
pub mod metrics;
pub mod security;
pub mod session;

pub use logging::logging_middleware;
pub use self::metrics::metrics_middleware;
pub use security::{request_screening_middleware, security_headers_middleware, MAX_BODY_SIZE};
pub use session::{extract_session_token, CurrentSession, GateRedirect, RequireAdmin, RequireUser};
