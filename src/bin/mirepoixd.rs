//! mirepoixd — recipe generation gateway daemon.
//!
//! Loads configuration from the environment (and a `.env` file when
//! present), builds the request pipeline for the configured provider, and
//! serves the HTTP surface.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use mirepoix::config::Config;
use mirepoix::pipeline::RecipePipeline;
use mirepoix::{providers, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let provider = providers::build_provider(&config.provider);
    let pipeline = RecipePipeline::builder()
        .provider(provider)
        .cache(config.cache.clone())
        .rate_limit(config.rate_limit.clone())
        .timeout(config.request_timeout)
        .build()?;

    let app = server::router(Arc::new(pipeline), config.cors_origin.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        provider = %config.provider.kind,
        model = %config.provider.model,
        "mirepoixd listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
