//! CORS middleware configuration for cross-origin requests.
//!
//! The mobile app talks to the API directly; the web build and local
//! tooling need explicit origins. Development allows any origin.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use hk_shared::config::CorsConfig;

/// Creates a CORS middleware instance from configuration.
///
/// With `allow_any_origin` every origin is accepted; otherwise only the
/// configured origins are.
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::USER_AGENT,
            header::HeaderName::from_static("x-requested-with"),
            header::HeaderName::from_static("x-app-version"),
            header::HeaderName::from_static("x-platform"),
        ])
        .expose_headers(vec![
            header::RETRY_AFTER,
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(config.max_age);

    if config.allow_any_origin {
        tracing::info!("Configuring permissive CORS (any origin)");
        return cors.allow_any_origin();
    }

    for origin in &config.allowed_origins {
        tracing::info!(origin = %origin, "Adding allowed origin");
        cors = cors.allowed_origin(origin);
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_configured_origin_is_allowed() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.homekeep.test".to_string()],
            ..Default::default()
        };
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://app.homekeep.test"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("https://app.homekeep.test")
        );
    }

    #[actix_web::test]
    async fn test_development_allows_any_origin() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&CorsConfig::development()))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:19006"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert!(resp
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
