use health_endpoint::observability::init_tracing;
use health_service::config::ServiceConfig;
use health_service::services::init_metrics;
use health_service::startup::Application;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = ServiceConfig::load()
        .map_err(|e| std::io::Error::other(format!("Configuration error: {}", e)))?;

    init_tracing(
        env!("CARGO_PKG_NAME"),
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )
    .map_err(|e| std::io::Error::other(format!("Tracing initialization error: {}", e)))?;

    init_metrics()
        .map_err(|e| std::io::Error::other(format!("Metrics initialization error: {}", e)))?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    let shutdown = app.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    app.run_until_stopped().await?;
    tracing::info!("Server stopped");

    Ok(())
}
