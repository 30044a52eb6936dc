use actix_web::{web, HttpResponse};
use validator::Validate;

use hk_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/auth/verify-2fa-code
///
/// # Request Body
///
/// ```json
/// { "userId": "user-123", "code": "482913" }
/// ```
///
/// # Responses
///
/// - 200: code accepted, `verifiedAt` set
/// - 404: no code outstanding for `userId`
/// - 400: code already used, expired, wrong, or too many wrong attempts
pub async fn verify_code(
    state: web::Data<AppState>,
    body: web::Json<VerifyCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    body.validate()?;

    let verified = state.verification.verify(&body.user_id, &body.code).await?;

    tracing::info!(user_id = %verified.identifier, "Two-factor code verified");

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Verified",
        VerifyCodeResponse {
            verified_at: verified.verified_at,
        },
    )))
}
