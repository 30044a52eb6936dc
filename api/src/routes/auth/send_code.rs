use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use hk_core::IssueRequest;
use hk_shared::types::ApiResponse;
use hk_shared::utils::email::mask_email;

use super::extract_client_ip;
use crate::app::AppState;
use crate::dto::{SendCodeRequest, SendCodeResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/auth/send-2fa-code
///
/// Generates a code for `userId`, stores it and emails it to `email`.
///
/// # Request Body
///
/// ```json
/// { "email": "jane@example.com", "userId": "user-123" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "message": "Verification code sent",
///     "expiresAt": "2026-01-01T10:05:00Z",
///     "resendAfterSeconds": 60
/// }
/// ```
///
/// ## Rate limited (429)
/// ```json
/// { "success": false, "error": "...", "errorCode": "RATE_LIMITED", "retryAfterSeconds": 240 }
/// ```
pub async fn send_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<SendCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    body.validate()?;

    if body.code.is_some() {
        tracing::warn!(
            user_id = %body.user_id,
            "Ignoring client-supplied verification code; codes are generated by the server"
        );
    }

    let client_ip = extract_client_ip(&req, &state.trusted_proxies);
    tracing::info!(
        user_id = %body.user_id,
        email = %mask_email(&body.email),
        client_ip = client_ip.as_deref().unwrap_or("unknown"),
        "Processing send-2fa-code request"
    );

    let mut request = IssueRequest::new(body.user_id, body.email);
    if let Some(ip) = client_ip {
        request = request.with_client_ip(ip);
    }

    let issued = state.verification.issue(request).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Verification code sent",
        SendCodeResponse {
            expires_at: issued.expires_at,
            resend_after_seconds: state.verification.config().resend_cooldown.num_seconds(),
        },
    )))
}
