//! fxbook service binary
//!
//! Tracks balances in several currencies, refreshes exchange rates from a
//! feed, and logs a report whenever anything changes.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fxbook_common::CurrencyRegistry;
use fxbook_coordinator::api::{create_router, ApiContext};
use fxbook_coordinator::fetcher::run_rate_fetcher;
use fxbook_coordinator::reporter::run_reporter;
use fxbook_coordinator::{Args, ServiceConfig, State};
use fxbook_fx::{CbrDailyFeed, RateFeed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_args(Args::parse());

    init_tracing(&config);

    info!("Service starting");

    let registry = CurrencyRegistry::standard();
    if let Err(e) = config.validate(&registry) {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let state = Arc::new(State::new(&registry, &config.state)?);
    let feed: Arc<dyn RateFeed> = Arc::new(CbrDailyFeed::new(
        config.fetch.feed_url.clone(),
        config.fetch.timeout,
    )?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let fetcher = tokio::spawn(run_rate_fetcher(
        state.clone(),
        feed,
        registry,
        config.fetch.clone(),
        shutdown_rx.clone(),
    ));
    let reporter = tokio::spawn(run_reporter(
        state.clone(),
        config.report.interval,
        shutdown_rx.clone(),
    ));

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
        }
        let _ = signal_tx.send(true);
    });

    let app = create_router(ApiContext {
        state: state.clone(),
        shutdown: shutdown_tx,
    });
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(
        listen_addr = %config.listen_addr,
        base_currency = %state.base_currency(),
        "Service running"
    );

    let mut server_rx = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // Resolves on `true` or when every sender is gone
            let _ = server_rx.wait_for(|stop| *stop).await;
        })
        .await?;

    info!("Service stopping");

    if let Err(e) = fetcher.await {
        error!(error = %e, "Rate fetcher task failed");
    }
    if let Err(e) = reporter.await {
        error!(error = %e, "Reporter task failed");
    }

    info!("Service stopped");
    Ok(())
}

fn init_tracing(config: &ServiceConfig) {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
