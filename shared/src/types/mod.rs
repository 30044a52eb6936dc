//! Type definitions shared by the API layer and its clients
//!
//! - `response` - API response envelope and health checks

pub mod response;

pub use response::{ApiResponse, HealthResponse, HealthStatus};
