//! # api-adapters
//!
//! The transport layer. One operation per core capability, marshalled over
//! HTTP with axum (feature `web-axum`); the handlers own nothing but
//! request parsing, identity extraction, and response shaping.

#[cfg(feature = "web-axum")]
pub mod http;

#[cfg(feature = "web-axum")]
pub use http::{router, AppState};
