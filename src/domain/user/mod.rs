//! User domain
//!
//! Identity types owned by the identity gateway: users, their open
//! metadata map and the role carried inside it.

mod entity;
mod repository;
mod validation;

pub use entity::{Role, User, UserId, UserMetadata};
pub use repository::UserRepository;
pub use validation::{validate_email, validate_password, validate_profile, UserValidationError};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
