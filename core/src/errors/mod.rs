//! Verification error taxonomy.
//!
//! Every outcome other than success is a distinct variant so the API layer
//! can map each one to its own status code and message.

use thiserror::Error;

/// Errors produced while issuing or verifying codes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Too many verification requests, retry in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Failed to deliver verification code: {reason}")]
    DeliveryFailed { reason: String },

    #[error("No verification code found")]
    NotFound,

    #[error("Verification code has already been used")]
    AlreadyUsed,

    #[error("Verification code has expired")]
    Expired,

    #[error("Verification code does not match")]
    Mismatch,

    #[error("Too many incorrect attempts, request a new code")]
    AttemptsExceeded,

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Verification store unavailable: {message}")]
    StoreUnavailable { message: String },
}

impl VerificationError {
    /// Validation error helper
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        VerificationError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Store failure helper, used when mapping trait seam errors
    pub fn store(message: impl Into<String>) -> Self {
        VerificationError::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::RateLimited { .. } => "RATE_LIMITED",
            VerificationError::DeliveryFailed { .. } => "DELIVERY_FAILED",
            VerificationError::NotFound => "CODE_NOT_FOUND",
            VerificationError::AlreadyUsed => "CODE_ALREADY_USED",
            VerificationError::Expired => "CODE_EXPIRED",
            VerificationError::Mismatch => "CODE_MISMATCH",
            VerificationError::AttemptsExceeded => "ATTEMPTS_EXCEEDED",
            VerificationError::Validation { .. } => "VALIDATION_ERROR",
            VerificationError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
        }
    }

    /// Whole minutes to wait before retrying, for rate limited errors
    pub fn retry_after_minutes(&self) -> Option<u64> {
        match self {
            VerificationError::RateLimited { retry_after_secs } => {
                Some(retry_after_secs.div_ceil(60).max(1))
            }
            _ => None,
        }
    }

    /// Whether the caller did something wrong (as opposed to a server fault)
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            VerificationError::DeliveryFailed { .. } | VerificationError::StoreUnavailable { .. }
        )
    }
}

pub type VerificationResult<T> = Result<T, VerificationError>;
