//! HTTP surface of the HomeKeep verification code service
//!
//! Exposes code issuance and verification over JSON, plus a health probe.
//! The binary in `main.rs` wires configuration, infrastructure and the
//! verification service into [`app::create_app`].

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
