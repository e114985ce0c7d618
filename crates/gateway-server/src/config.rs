//! Server configuration loaded from environment variables.

use klump_payments::{GatewayConfig, PaymentError};
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Gateway configuration (keys, callback URL, conversion flags).
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// Demo-data seeding for the in-memory ledger.
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    /// Seed a sample invoice so the checkout page works out of the box.
    /// Real deployments back the ledger with the billing database instead.
    #[serde(default = "default_true")]
    pub seed_invoices: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed_invoices: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, PaymentError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let source = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Keep strings as strings; secret keys must never be
                    // reinterpreted as numbers.
                    .try_parsing(false),
            )
            .build()
            .map_err(|e| PaymentError::ConfigLoadFailure(e.to_string()))?;

        Self::from_source(source)
    }

    fn from_source(source: config::Config) -> Result<Self, PaymentError> {
        source
            .try_deserialize()
            .map_err(|e| PaymentError::ConfigLoadFailure(e.to_string()))
    }
}
