//! Row-level read/write policy for registrations
//!
//! Stores apply this policy on every query independently of the page gate,
//! so a caller only ever sees rows it owns unless it is an admin.

use crate::domain::user::{Role, User, UserId};

/// The identity a store query runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
    role: Role,
}

impl Caller {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// `row.user_id = caller.id OR caller.role = admin`
    pub fn can_read(&self, owner: &UserId) -> bool {
        self.user_id == *owner || self.role == Role::Admin
    }

    /// Rows may only be inserted for the caller itself
    pub fn can_insert(&self, owner: &UserId) -> bool {
        self.user_id == *owner
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self::new(*user.id(), user.role())
    }
}
