//! Gateway configuration.
//!
//! A [`GatewayConfig`] is an explicit value object built once (from the
//! environment or by the host) and passed by reference to each component.
//! There is no ambient/static configuration access anywhere in the crate.

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Gateway module name, used as the payment record's gateway label and as
/// the status key in the host's gateway log.
pub const GATEWAY_NAME: &str = "klump";

/// Main gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Whether the gateway module is activated.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Test mode: selects the test credential pair for every call.
    #[serde(default = "default_test_mode")]
    pub test_mode: bool,

    /// Test-environment public key.
    #[serde(default)]
    pub test_public_key: String,

    /// Test-environment secret key.
    #[serde(default = "default_secret")]
    pub test_secret_key: SecretString,

    /// Live-environment public key.
    #[serde(default)]
    pub live_public_key: String,

    /// Live-environment secret key.
    #[serde(default = "default_secret")]
    pub live_secret_key: SecretString,

    /// Convert the captured amount into the invoice's billing currency when
    /// the two differ.
    #[serde(default)]
    pub convert_to_currency: bool,

    /// Base URL of the host billing installation.
    #[serde(default = "default_system_url")]
    pub system_url: String,

    /// Path of this gateway's callback endpoint, appended to `system_url`.
    #[serde(default = "default_callback_path")]
    pub callback_path: String,

    /// Klump API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout for provider API requests.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Minimum loan amount Klump accepts.
    #[serde(default = "default_minimum_amount")]
    pub minimum_amount: f64,

    /// Currencies the provider supports at checkout.
    #[serde(default = "default_supported_currencies")]
    pub supported_currencies: Vec<String>,

    /// Support contact shown in verification-failure messages.
    #[serde(default)]
    pub support_email: Option<String>,

    /// HTTP server port for the gateway endpoints.
    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_enabled() -> bool {
    false
}

fn default_test_mode() -> bool {
    true
}

fn default_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_system_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_callback_path() -> String {
    "/klump/verify-payment".to_string()
}

fn default_api_base_url() -> String {
    klump_client::DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_minimum_amount() -> f64 {
    25_000.0
}

fn default_supported_currencies() -> Vec<String> {
    vec!["NGN".to_string()]
}

fn default_server_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            test_mode: default_test_mode(),
            test_public_key: String::new(),
            test_secret_key: default_secret(),
            live_public_key: String::new(),
            live_secret_key: default_secret(),
            convert_to_currency: false,
            system_url: default_system_url(),
            callback_path: default_callback_path(),
            api_base_url: default_api_base_url(),
            request_timeout: default_request_timeout(),
            minimum_amount: default_minimum_amount(),
            supported_currencies: default_supported_currencies(),
            support_email: None,
            server_port: default_server_port(),
        }
    }
}

/// A (public key, secret key) pair scoped to one credential environment.
///
/// Test and live pairs are disjoint; a pair is selected exactly once per
/// request and never mixed across environments.
#[derive(Debug, Clone)]
pub struct CredentialPair {
    pub public_key: String,
    pub secret_key: SecretString,
}

impl GatewayConfig {
    /// Select the credential pair for the active environment.
    ///
    /// The single selection point used by both the checkout initiator and
    /// the server-side verifier.
    pub fn credentials(&self) -> CredentialPair {
        if self.test_mode {
            CredentialPair {
                public_key: self.test_public_key.clone(),
                secret_key: self.test_secret_key.clone(),
            }
        } else {
            CredentialPair {
                public_key: self.live_public_key.clone(),
                secret_key: self.live_secret_key.clone(),
            }
        }
    }

    /// Full callback URL the provider redirects the browser to.
    pub fn callback_url(&self) -> String {
        format!(
            "{}{}",
            self.system_url.trim_end_matches('/'),
            self.callback_path
        )
    }

    /// Host invoice view URL.
    pub fn invoice_url(&self, invoice_id: u64) -> String {
        format!(
            "{}/viewinvoice.php?id={invoice_id}",
            self.system_url.trim_end_matches('/')
        )
    }

    /// Whether a currency is accepted at checkout.
    pub fn supports_currency(&self, code: &str) -> bool {
        self.supported_currencies.iter().any(|c| c == code)
    }
}
