use anyhow::Context;
use dotenv::dotenv;
use search_api::{
    server::{self, AppState},
    ApiConfig,
};
use std::env;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tweet_indexer_repository::{RediSearchProvider, SearchIndexService};

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("search_api=info,tweet_indexer_repository=info,tower_http=info")
    });

    let json_logs = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()?;
    }

    info!(
        service_name = "search-api",
        service_version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
    Ok(())
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal, draining requests");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment and logging
    dotenv().ok();
    init_tracing()?;

    info!("Starting search api server...");

    let config = ApiConfig::from_env().context("failed to load configuration")?;

    let provider = RediSearchProvider::connect(&config.redis)
        .await
        .context("failed to connect to Redis")?;
    info!(index = %provider.index_name(), "Connected to Redis");

    let search_index = Arc::new(SearchIndexService::new(Arc::new(provider)));
    let app = server::create_app(AppState::new(Arc::clone(&search_index)));

    let result = server::run_server(app, config.listen_addr(), shutdown_signal()).await;

    // Release the Redis connection once the listener has drained.
    drop(search_index);

    if let Err(e) = &result {
        error!(error = %e, "Server error");
    } else {
        info!("Search api stopped");
    }
    result
}
