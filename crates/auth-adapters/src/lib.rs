//! # auth-adapters
//!
//! Implementations of the [`domains::IdentityResolver`] port. Token
//! issuance flows live outside the core; the [`jwt::JwtIdentityResolver`]
//! only verifies credentials and hands back a caller id. The `mint` helper
//! exists for tests and the seed tool.

#[cfg(feature = "auth-jwt")]
pub mod jwt;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtIdentityResolver;
