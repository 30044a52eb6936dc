//! Mapping of service failures onto HTTP responses
//!
//! Every [`VerificationError`] keeps its own status, stable error code and
//! message so clients can tell an expired code from a wrong one.

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use hk_core::VerificationError;
use hk_shared::types::ApiResponse;
use validator::ValidationErrors;

use crate::dto::RetryAfter;

/// Errors returned by API handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Request body could not be parsed or failed validation
    #[error("{0}")]
    BadRequest(String),

    #[error("The requested resource was not found")]
    RouteNotFound,
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    (field.clone(), message)
                })
            })
            .collect();
        messages.sort();

        let message = messages
            .into_iter()
            .next()
            .map(|(_, message)| message)
            .unwrap_or_else(|| "Invalid request data".to_string());
        ApiError::BadRequest(message)
    }
}

impl ApiError {
    /// Stable code clients can branch on
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Verification(e) => e.error_code(),
            ApiError::BadRequest(_) => "VALIDATION_ERROR",
            ApiError::RouteNotFound => "NOT_FOUND",
        }
    }

    /// User-facing message
    ///
    /// Store failures are reported generically; their detail only goes to
    /// the logs.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Verification(e) => match e {
                VerificationError::RateLimited { .. } => format!(
                    "Too many verification requests. Please try again in {} minutes",
                    e.retry_after_minutes().unwrap_or(1)
                ),
                VerificationError::DeliveryFailed { .. } => {
                    "Failed to send verification email. Please try again later".to_string()
                }
                VerificationError::NotFound => {
                    "No verification code found. Please request a new code".to_string()
                }
                VerificationError::AlreadyUsed => {
                    "This verification code has already been used".to_string()
                }
                VerificationError::Expired => {
                    "Verification code has expired. Please request a new code".to_string()
                }
                VerificationError::Mismatch => "Invalid verification code".to_string(),
                VerificationError::AttemptsExceeded => {
                    "Too many incorrect attempts. Please request a new code".to_string()
                }
                VerificationError::Validation { message, .. } => message.clone(),
                VerificationError::StoreUnavailable { .. } => {
                    "An internal error occurred. Please try again later".to_string()
                }
            },
            ApiError::BadRequest(message) => message.clone(),
            ApiError::RouteNotFound => self.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Verification(e) => match e {
                VerificationError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                VerificationError::NotFound => StatusCode::NOT_FOUND,
                VerificationError::AlreadyUsed
                | VerificationError::Expired
                | VerificationError::Mismatch
                | VerificationError::AttemptsExceeded
                | VerificationError::Validation { .. } => StatusCode::BAD_REQUEST,
                VerificationError::DeliveryFailed { .. }
                | VerificationError::StoreUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "Request rejected");
        }

        let mut builder = HttpResponse::build(status);
        match self {
            ApiError::Verification(VerificationError::RateLimited { retry_after_secs }) => builder
                .insert_header((header::RETRY_AFTER, retry_after_secs.to_string()))
                .json(ApiResponse::failure_with(
                    self.user_message(),
                    self.error_code(),
                    RetryAfter {
                        retry_after_seconds: *retry_after_secs,
                    },
                )),
            _ => builder.json(ApiResponse::failure(self.user_message(), self.error_code())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(e: VerificationError) -> StatusCode {
        ApiError::from(e).status_code()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status(VerificationError::RateLimited { retry_after_secs: 240 }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(status(VerificationError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(VerificationError::Expired), StatusCode::BAD_REQUEST);
        assert_eq!(status(VerificationError::Mismatch), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(VerificationError::DeliveryFailed {
                reason: "smtp down".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(VerificationError::store("connection refused")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rejections_have_distinct_messages() {
        let messages: Vec<String> = [
            VerificationError::AlreadyUsed,
            VerificationError::Expired,
            VerificationError::Mismatch,
            VerificationError::AttemptsExceeded,
            VerificationError::NotFound,
        ]
        .into_iter()
        .map(|e| ApiError::from(e).user_message())
        .collect();

        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_store_detail_is_not_exposed() {
        let error = ApiError::from(VerificationError::store("redis at 10.0.0.5 refused"));
        assert!(!error.user_message().contains("10.0.0.5"));
    }

    #[test]
    fn test_rate_limit_message_in_minutes() {
        let error = ApiError::from(VerificationError::RateLimited { retry_after_secs: 240 });
        assert!(error.user_message().contains("4 minutes"));
    }
}
