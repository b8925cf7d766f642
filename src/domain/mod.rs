//! Domain layer - Core business logic and entities

pub mod access;
pub mod error;
pub mod registration;
pub mod user;
pub mod validation;

pub use access::{authorize, Access, SessionContext, DASHBOARD_ROUTE, LOGIN_ROUTE};
pub use error::DomainError;
pub use registration::{
    Caller, NewRegistration, Registration, RegistrationDetails, RegistrationId,
    RegistrationRepository, RegistrationStatus, RegistrationWizard, TshirtSize,
};
pub use user::{Role, User, UserId, UserMetadata, UserRepository};
