//! Authentication infrastructure module
//!
//! Signed session tokens carried in the session cookie or a bearer header.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
