use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod auth;
pub mod chain;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod gatekeeper;
pub mod health;
pub mod idempotency;
pub mod metrics;
pub mod oracle;
pub mod preflight;
pub mod rate_limit;
pub mod receipt;
pub mod routes;
pub mod utils;
pub mod validation;

use chain::{EvmSweeperChain, SweeperChain};
use config::Config;
use context::AppContext;
use dispatch::{DispatchQueue, retry};
use idempotency::CacheSweepTask;
use oracle::{HttpPriceOracle, PriceOracle};

/// Wire the relay around its two external collaborators.
///
/// Fetches the sponsor's starting nonce, starts the dispatch worker and the
/// idempotency sweep task. Must be called inside a tokio runtime.
pub async fn build_context(
    config: Arc<Config>,
    chain: Arc<dyn SweeperChain>,
    oracle: Arc<dyn PriceOracle>,
) -> Result<Arc<AppContext>> {
    let initial_nonce = retry(config.dispatch.submit, "pending_nonce", |_| {
        chain.pending_nonce()
    })
    .await
    .context("Failed to fetch sponsor nonce")?;

    tracing::info!(
        sponsor = %chain.sponsor(),
        nonce = initial_nonce,
        "Sponsor account ready"
    );

    let dispatch = DispatchQueue::start(chain.clone(), initial_nonce, config.dispatch.clone());
    let app_context = Arc::new(AppContext::new(config.clone(), chain, oracle, dispatch));

    let sweep_task = CacheSweepTask::new(
        app_context.idempotency.clone(),
        app_context.rate_limiter.clone(),
        Duration::from_secs(config.idempotency_sweep_interval_secs),
    );
    tokio::spawn(sweep_task.run());

    Ok(app_context)
}

/// Serve the router on `listener` until the future resolves
pub async fn serve(listener: TcpListener, app_context: Arc<AppContext>) -> Result<()> {
    let app = routes::create_router(app_context);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server failed")
}

/// Tracing filter from the configured directives; unparsable input falls back to `info`
fn log_filter(directives: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_new(directives)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

pub async fn run() -> Result<()> {
    // Load configuration (also picks up RUST_LOG from .env)
    let config = Arc::new(Config::from_env().context("Failed to load configuration")?);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(log_filter(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("=== Dust Relayer Starting ===");
    tracing::info!(
        port = config.port,
        destination_chain_id = config.destination_chain_id,
        sweeper = %config.chain.sweeper_address,
        "Configuration loaded"
    );

    let chain: Arc<dyn SweeperChain> = Arc::new(
        EvmSweeperChain::connect(&config.chain).context("Failed to set up chain client")?,
    );

    let oracle: Arc<dyn PriceOracle> = Arc::new(
        HttpPriceOracle::new(config.chain.oracle_url.clone())
            .context("Failed to set up price oracle client")?,
    );

    let app_context = build_context(config.clone(), chain, oracle).await?;

    let bind_address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    tracing::info!("Dust relayer listening on {}", bind_address);

    tokio::select! {
        res = serve(listener, app_context) => {
            if let Err(e) = res {
                tracing::error!("HTTP server failed: {:#}", e);
            }
        },
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown signal received. Shutting down...");
        }
    }

    Ok(())
}
