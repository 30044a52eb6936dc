//! Verification service module for email-based two-factor codes
//!
//! This module provides the complete code lifecycle:
//! - Code generation, storage and email delivery (issuer)
//! - Single-use verification with a short retention grace window (verifier)
//! - Periodic cleanup of expired and spent records (sweeper)
//! - Per-identifier serialization of state changes

mod config;
mod issuer;
mod locks;
mod message;
mod service;
mod sweeper;
mod traits;
mod types;
mod verifier;

#[cfg(test)]
mod tests;

pub use config::{bounded_seconds, VerificationServiceConfig};
pub use issuer::Issuer;
pub use locks::{KeyGuard, KeyedLocks};
pub use message::render_code_email;
pub use service::VerificationService;
pub use sweeper::{Sweeper, SweeperHandle};
pub use traits::{CodeStore, EmailSender, RateLimiter};
pub use types::{EmailMessage, IssueRequest, IssuedCode, SweepReport, VerifiedCode};
pub use verifier::Verifier;
