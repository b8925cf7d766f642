//! Access control gate for protected pages
//!
//! The gate is a pure decision over an explicit [`SessionContext`]: it never
//! fails and never touches role state. Every outcome is either "render the
//! page for this user" or "redirect to this route".

use super::user::{Role, User};

/// Route unauthenticated visitors are sent to
pub const LOGIN_ROUTE: &str = "/login";

/// Route signed-in users without the required role are sent to
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Session state resolved for a single request
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Option<User>,
}

impl SessionContext {
    /// A request without a usable session
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// A request with a resolved user
    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Outcome of the gate
#[derive(Debug, Clone)]
pub enum Access {
    /// Render the page for this user
    Granted(User),
    /// Stop here and send the client to this route
    Redirect(&'static str),
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::Redirect(route) => Some(route),
            Self::Granted(_) => None,
        }
    }
}

/// Decide whether a protected page may render
///
/// Only [`Role::Admin`] is a meaningful requirement; `Some(Role::User)` is
/// the same as `None` since every signed-in user holds it.
pub fn authorize(session: &SessionContext, required_role: Option<Role>) -> Access {
    let Some(user) = session.user() else {
        return Access::Redirect(LOGIN_ROUTE);
    };

    if required_role == Some(Role::Admin) && user.role() != Role::Admin {
        return Access::Redirect(DASHBOARD_ROUTE);
    }

    Access::Granted(user.clone())
}
