use anyhow::Context;

use fieldops_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fieldops_observability::init();

    let config = ApiConfig::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let auth = fieldops_api::app::services::build_services(&config).await?;
    let app = fieldops_api::app::build_app(auth);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
