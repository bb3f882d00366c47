use anyhow::Context;

use cargodesk_api::app::{build_app, services::AppServices};
use cargodesk_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cargodesk_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.session.dev_secret {
        tracing::warn!("SESSION_SECRET not set; using insecure dev default");
    }
    if config.admin.password.is_none() {
        tracing::warn!("ADMIN_PASSWORD not set; admin login is disabled");
    }

    let services = AppServices::from_config(&config).await?;
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
