use actix_web::{web, HttpResponse};
use chrono::Utc;

use hk_shared::types::{HealthResponse, HealthStatus};

use crate::app::AppState;

/// Health check endpoint handler
///
/// Reports `degraded` with 503 when the storage backend does not answer.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = state.infrastructure.health_check().await;

    let response = HealthResponse {
        status: if healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        service: "homekeep-verification".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
