//! Klump Payment Gateway - standalone server entry point.

mod config;
mod error;

use crate::config::Config;
use crate::error::AppResult;
use klump_client::KlumpClient;
use klump_payments::api::{create_router, AppState};
use klump_payments::host::{Currency, Invoice, MemoryLedger};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config.log.level);

    info!("Starting Klump payment gateway...");

    if !config.gateway.enabled {
        warn!("Gateway is not activated; callbacks will be rejected until GATEWAY__ENABLED is set");
    }
    info!(
        "Environment: {}",
        if config.gateway.test_mode { "test" } else { "live" }
    );

    // Provider client, bound to the secret key of the active environment
    let credentials = config.gateway.credentials();
    let client = Arc::new(KlumpClient::new(
        credentials.secret_key.expose_secret().clone(),
        config.gateway.api_base_url.clone(),
        config.gateway.request_timeout,
    )?);

    if client.health_check().await {
        info!("Klump API reachable at {}", config.gateway.api_base_url);
    } else {
        warn!("Klump API health check failed - will retry on callbacks");
    }

    // In-memory ledger; real deployments back this with the billing database
    let ledger = Arc::new(MemoryLedger::new());
    if config.demo.seed_invoices {
        seed_demo_data(&ledger).await;
    }

    let state = Arc::new(AppState::new(config.gateway.clone(), client, ledger));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.server_port));
    let listener = TcpListener::bind(addr).await?;

    info!("Gateway listening on {}", addr);
    info!("Callback URL: {}", config.gateway.callback_url());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

/// Initialize tracing with `RUST_LOG` or the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Seed a sample NGN invoice so `/klump/invoices/1/pay` works out of the box.
async fn seed_demo_data(ledger: &MemoryLedger) {
    ledger
        .add_currency(Currency {
            id: 1,
            code: "NGN".into(),
            exchange_rate: 1.0,
        })
        .await;
    ledger
        .add_invoice(Invoice {
            id: 1,
            user_id: 1,
            amount: 30_000.0,
            description: "Web hosting - annual".into(),
            currency_id: 1,
            client_name: "Demo Client".into(),
            client_email: "demo@example.com".into(),
        })
        .await;

    info!("Seeded demo invoice 1 (30000 NGN)");
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
