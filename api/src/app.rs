//! Application state and factory
//!
//! This module holds the shared application state and builds the Actix-web
//! application used by both the server binary and the route tests.

use std::net::IpAddr;
use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use hk_core::VerificationService;
use hk_infra::InfrastructureServices;
use hk_shared::config::CorsConfig;

use crate::handlers::ApiError;
use crate::middleware::create_cors;
use crate::routes::{auth, health};

/// Application state that holds shared services
pub struct AppState {
    pub verification: Arc<VerificationService>,
    pub infrastructure: InfrastructureServices,
    /// Peers whose forwarding headers are believed
    pub trusted_proxies: Vec<IpAddr>,
}

impl AppState {
    pub fn new(verification: Arc<VerificationService>, infrastructure: InfrastructureServices) -> Self {
        Self {
            verification,
            infrastructure,
            trusted_proxies: Vec::new(),
        }
    }

    pub fn with_trusted_proxies(mut self, proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        self.trusted_proxies = proxies.into_iter().collect();
        self
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
    cors: &CorsConfig,
    max_payload_size: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(json_config(max_payload_size))
        // The last wrap is outermost, so every request gets a span before CORS runs
        .wrap(create_cors(cors))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health::health_check))
        .configure(auth::configure)
        .default_service(web::route().to(not_found))
}

/// JSON extractor settings
///
/// Malformed or oversized bodies become the same 400 envelope as validation
/// failures instead of actix's plain-text error.
pub fn json_config(max_payload_size: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_payload_size)
        .error_handler(|err, _req| {
            tracing::debug!(error = %err, "Rejected request body");
            ApiError::BadRequest(format!("Invalid request body: {}", err)).into()
        })
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    actix_web::ResponseError::error_response(&ApiError::RouteNotFound)
}
