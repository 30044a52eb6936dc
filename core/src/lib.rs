//! # HomeKeep Core
//!
//! Domain layer of the HomeKeep two-factor verification service.
//! This crate holds the verification record and rate limit entities, the
//! error taxonomy, and the services that issue, verify and sweep codes.
//! Storage, rate limiting and email delivery are reached through traits
//! implemented in `hk_infra`.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
