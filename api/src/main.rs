use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;

use hk_api::telemetry::init_tracing;
use hk_api::{create_app, AppState};
use hk_core::{VerificationService, VerificationServiceConfig};
use hk_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    init_tracing(&config.logging)?;

    info!(
        environment = ?config.environment,
        backend = ?config.cache.backend,
        "Starting HomeKeep verification service"
    );

    let infrastructure = hk_infra::initialize(&config)
        .await
        .context("failed to initialize infrastructure")?;

    let verification = Arc::new(VerificationService::new(
        Arc::clone(&infrastructure.code_store),
        Arc::clone(&infrastructure.rate_limiter),
        Arc::clone(&infrastructure.email_sender),
        VerificationServiceConfig::from_settings(
            &config.verification,
            config.rate_limit.key,
            &config.email,
        ),
    ));

    let sweeper = verification.spawn_sweeper();

    let trusted_proxies = config
        .server
        .trusted_proxy_addrs()
        .context("invalid TRUSTED_PROXIES")?;
    if !trusted_proxies.is_empty() {
        info!(trusted_proxies = ?trusted_proxies, "Honouring forwarding headers from trusted proxies");
    }
    let state = web::Data::new(
        AppState::new(verification, infrastructure).with_trusted_proxies(trusted_proxies),
    );
    let cors = config.cors.clone();
    let max_payload_size = config.server.max_payload_size;

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone(), &cors, max_payload_size))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await?;

    info!("Server stopped, shutting down sweeper");
    sweeper.shutdown().await;

    Ok(())
}
