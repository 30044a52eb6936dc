//! API response types and wrappers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard API response envelope
///
/// Successful responses carry `success: true` and a `message`; failures carry
/// `success: false`, a human-readable `error` and a stable `errorCode`.
/// Endpoint-specific fields are flattened into the same object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,

    /// Human-readable message (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Human-readable error (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Stable error code for programmatic handling (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    /// Endpoint-specific payload
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            error_code: None,
            data: Some(data),
        }
    }

    /// Create an error response with an additional payload
    pub fn failure_with(error: impl Into<String>, code: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            error_code: Some(code.into()),
            data: Some(data),
        }
    }

    /// Check if the response is successful
    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl ApiResponse<()> {
    /// Create a successful response without a payload
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            error_code: None,
            data: None,
        }
    }

    /// Create an error response
    pub fn failure(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            error_code: Some(code.into()),
            data: None,
        }
    }
}

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,

    /// Service name
    pub service: String,

    /// Server version
    pub version: String,

    /// Server timestamp
    pub timestamp: DateTime<Utc>,
}
