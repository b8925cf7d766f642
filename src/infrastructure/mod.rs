//! Infrastructure layer - Storage, identity and service implementations

pub mod auth;
pub mod identity;
pub mod logging;
pub mod observability;
pub mod registration;
pub mod storage;
