//! Transaction verification.

use crate::error::PaymentError;
use crate::types::{SettlementOutcome, VerifiedTransaction};
use klump_client::KlumpClient;
use std::sync::Arc;
use tracing::{info, instrument};

/// Fetches the authoritative transaction state from the provider and maps
/// it to a settlement outcome.
#[derive(Clone)]
pub struct PaymentVerifier {
    client: Arc<KlumpClient>,
}

impl PaymentVerifier {
    pub fn new(client: Arc<KlumpClient>) -> Self {
        Self { client }
    }

    /// Verify a transaction by its provider reference.
    ///
    /// Fails with `MissingTransactionData` when the provider has no payload
    /// for the reference. The settlement amount is the unit price of the
    /// first line item; multi-item carts are out of scope.
    #[instrument(skip(self))]
    pub async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, PaymentError> {
        let response = self.client.verify_transaction(reference).await?;

        let data = response
            .data
            .as_ref()
            .ok_or_else(|| PaymentError::MissingTransactionData(reference.to_string()))?;

        let amount = data
            .items
            .first()
            .map(|item| item.unit_price)
            .ok_or_else(|| PaymentError::MissingTransactionData(reference.to_string()))?;

        let outcome = if response.is_successful() {
            SettlementOutcome::Successful
        } else {
            SettlementOutcome::Unsuccessful
        };

        info!(
            "Verified {}: {} ({} {})",
            reference, outcome, amount, data.currency
        );

        Ok(VerifiedTransaction {
            reference: reference.to_string(),
            outcome,
            amount,
            currency: data.currency.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn verifier_for(mock_server: &MockServer) -> PaymentVerifier {
        let client =
            KlumpClient::new("sk_test", mock_server.uri(), Duration::from_secs(5)).unwrap();
        PaymentVerifier::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_success_state_maps_to_successful() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/transactions/CLDKP_42_1700000000/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "state": "success",
                "data": {
                    "currency": "NGN",
                    "items": [{"unit_price": 30000.0, "quantity": 1}]
                }
            })))
            .mount(&mock_server)
            .await;

        let verified = verifier_for(&mock_server)
            .verify("CLDKP_42_1700000000")
            .await
            .unwrap();

        assert_eq!(verified.outcome, SettlementOutcome::Successful);
        assert_eq!(verified.amount, 30_000.0);
        assert_eq!(verified.currency, "NGN");
    }

    #[tokio::test]
    async fn test_non_success_state_maps_to_unsuccessful() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "state": "pending",
                "data": {
                    "currency": "NGN",
                    "items": [{"unit_price": 30000.0}]
                }
            })))
            .mount(&mock_server)
            .await;

        let verified = verifier_for(&mock_server)
            .verify("CLDKP_42_1700000000")
            .await
            .unwrap();

        assert_eq!(verified.outcome, SettlementOutcome::Unsuccessful);
    }

    #[tokio::test]
    async fn test_missing_data_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"state": "failed"})),
            )
            .mount(&mock_server)
            .await;

        let err = verifier_for(&mock_server)
            .verify("CLDKP_42_1700000000")
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::MissingTransactionData(_)));
    }

    #[tokio::test]
    async fn test_empty_items_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "state": "success",
                "data": {"currency": "NGN", "items": []}
            })))
            .mount(&mock_server)
            .await;

        let err = verifier_for(&mock_server)
            .verify("CLDKP_42_1700000000")
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::MissingTransactionData(_)));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_unreachable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let err = verifier_for(&mock_server)
            .verify("CLDKP_42_1700000000")
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::ProviderUnreachable(_)));
    }

    #[tokio::test]
    async fn test_client_error_maps_to_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = verifier_for(&mock_server)
            .verify("CLDKP_42_1700000000")
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::ProviderResponseInvalid(_)));
    }
}
