mod api;
mod middleware;
mod refresh;
mod scheduler;
mod signature;

use std::sync::Arc;
use std::time::Duration;

use shopagent_catalog::CatalogCache;
use shopagent_checkout::Checkout;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    refresh::Refresher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(shopagent_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    for warning in shopagent_core::missing_credentials(&config) {
        tracing::warn!("config: {warning}");
    }

    let cache = Arc::new(CatalogCache::new(
        config.products_path.clone(),
        config.external_products_path.clone(),
    ));
    let refresher = Arc::new(Refresher::from_config(&config, Arc::clone(&cache))?);
    let checkout = Arc::new(Checkout::from_config(
        &config.stripe,
        config.scraper_request_timeout_secs,
    )?);

    refresher.startup().await;
    let snapshot = cache.snapshot().await;
    tracing::info!(
        products = snapshot.shopify.len(),
        external_products = snapshot.external.len(),
        "catalog: ready"
    );

    let _scheduler = scheduler::build_scheduler(
        Arc::clone(&refresher),
        Duration::from_secs(config.refresh_interval_secs),
    )
    .await?;

    let app = build_app(AppState {
        config: Arc::clone(&config),
        refresher,
        checkout,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
