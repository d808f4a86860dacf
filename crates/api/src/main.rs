use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    salespoint_observability::init();

    let config = salespoint_api::config::AppConfig::from_env();
    let services = Arc::new(salespoint_api::app::services::build_services(&config).await?);
    let app = salespoint_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler; running without graceful shutdown");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
