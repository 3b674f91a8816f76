use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

use gemtrend::api::{self, AppState};
use gemtrend::config::Config;
use gemtrend::metrics;
use gemtrend::refresh::{Refresher, SnapshotHandle};
use gemtrend::source::NaverDataLabClient;

/// Run the scheduled refresh loop and the read API until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed; continuing without metrics");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let client = NaverDataLabClient::from_config(&config)?;
    let handle = SnapshotHandle::new();
    let refresher = Arc::new(Refresher::new(client, config, handle.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let refresh_task = {
        let refresher = Arc::clone(&refresher);
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { refresher.run(shutdown).await })
    };

    let server_task = tokio::spawn(api::serve(addr, AppState::new(handle), shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");
    shutdown_tx.send(true).ok();

    refresh_task.await.context("Refresh task panicked")?;
    server_task.await.context("Server task panicked")??;

    Ok(())
}
