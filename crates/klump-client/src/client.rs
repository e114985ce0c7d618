//! Klump HTTP client.

use crate::error::KlumpError;
use crate::types::VerifyTransactionResponse;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Request header carrying the merchant's secret key.
const SECRET_KEY_HEADER: &str = "klump-secret-key";

/// Default Klump API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.useklump.com";

/// Klump API client.
///
/// The secret key is stored using `SecretString` to prevent accidental
/// exposure in logs or debug output. One client is bound to exactly one
/// credential environment (test or live); callers pick the key before
/// constructing it.
#[derive(Clone)]
pub struct KlumpClient {
    client: Client,
    base_url: String,
    secret_key: SecretString,
}

impl KlumpClient {
    /// Create a new Klump client.
    pub fn new(
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, KlumpError> {
        let client = Client::builder().timeout(timeout).build()?;
        let secret_key: String = secret_key.into();

        Ok(Self {
            client,
            base_url: base_url.into(),
            secret_key: SecretString::new(secret_key.trim().to_string()),
        })
    }

    /// Verification URL for a transaction reference.
    ///
    /// The reference is percent-encoded into the fixed path template.
    pub fn verify_url(&self, reference: &str) -> String {
        format!(
            "{}/v1/transactions/{}/verify",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(reference)
        )
    }

    /// Fetch the authoritative state of a transaction by its reference.
    ///
    /// This is the only source of truth for settlement decisions; callers
    /// must never trust a client-supplied status instead.
    #[instrument(skip(self))]
    pub async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<VerifyTransactionResponse, KlumpError> {
        if reference.trim().is_empty() {
            return Err(KlumpError::EmptyReference);
        }

        let response = self
            .client
            .get(self.verify_url(reference))
            .header(SECRET_KEY_HEADER, self.secret_key.expose_secret())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Health check - returns true if the API host is reachable.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(self.base_url.trim_end_matches('/'))
            .send()
            .await
            .is_ok()
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, KlumpError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            // Truncate on a char boundary; a byte slice would panic on
            // multi-byte UTF-8 in the body.
            let preview = body
                .char_indices()
                .nth(200)
                .map_or(body.as_str(), |(i, _)| &body[..i]);
            debug!("Response body: {}", preview);
            serde_json::from_str(&body).map_err(KlumpError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> KlumpError {
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Klump rejected the secret key");
                KlumpError::Unauthorized
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".into());
                KlumpError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}
