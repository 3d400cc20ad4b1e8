use anyhow::Context;

use quotedesk_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quotedesk_observability::init();

    let config = AppConfig::from_env()?;
    let app = quotedesk_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
