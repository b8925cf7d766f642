//! Identity gateway
//!
//! Password accounts with Argon2 credentials, signed session tokens, an open
//! per-user metadata map and a broadcast of session changes.

mod events;
mod password;
mod postgres_repository;
mod repository;
mod service;

pub use events::{log_session_events, SessionEvent};
pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{IdentityService, Session, SignUpRequest};
