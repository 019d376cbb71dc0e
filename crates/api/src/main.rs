use std::sync::Arc;

use anyhow::Context;

use fedgate_api::app::{build_app, services::build_services};
use fedgate_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fedgate_observability::init();

    let config = AppConfig::from_env().context("loading configuration")?;
    tracing::info!(config = ?config, "configuration loaded");

    let services = Arc::new(build_services(&config).await?);
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
