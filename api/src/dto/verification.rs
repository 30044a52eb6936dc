use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeRequest {
    /// Address the code is delivered to
    #[serde(default)]
    #[validate(length(min = 1, max = 254, message = "Email is required"))]
    pub email: String,

    /// User id or provisional registration key the code is bound to
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "userId is required"))]
    pub user_id: String,

    /// Accepted for compatibility with older clients and ignored; codes are
    /// always generated on the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "userId is required"))]
    pub user_id: String,

    /// Submitted code; surrounding whitespace is ignored
    #[serde(default)]
    #[validate(length(min = 1, max = 32, message = "Verification code is required"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeResponse {
    pub expires_at: DateTime<Utc>,
    /// Seconds until the client should offer a resend
    pub resend_after_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeResponse {
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryAfter {
    pub retry_after_seconds: u64,
}
