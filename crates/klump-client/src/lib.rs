//! Klump "buy now, pay later" API client.
//!
//! Covers the single endpoint the gateway needs: fetching the authoritative
//! state of a transaction by its merchant reference
//! (`GET /v1/transactions/{reference}/verify`).

mod client;
mod error;
mod types;

pub use client::{KlumpClient, DEFAULT_BASE_URL};
pub use error::KlumpError;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> KlumpClient {
        KlumpClient::new(
            "test-secret-key",
            mock_server.uri(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_verify_success() {
        let mock_server = MockServer::start().await;

        let response_body = serde_json::json!({
            "state": "success",
            "data": {
                "currency": "NGN",
                "merchant_reference": "CLDKP_42_1700000000",
                "items": [{
                    "name": "Invoice #42",
                    "unit_price": 30000.0,
                    "quantity": 1
                }]
            }
        });

        Mock::given(method("GET"))
            .and(path("/v1/transactions/CLDKP_42_1700000000/verify"))
            .and(header("klump-secret-key", "test-secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let response = client
            .verify_transaction("CLDKP_42_1700000000")
            .await
            .unwrap();

        assert!(response.is_successful());
        assert_eq!(response.first_unit_price(), Some(30000.0));
        assert_eq!(response.data.unwrap().currency, "NGN");
    }

    #[tokio::test]
    async fn test_verify_missing_data() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/transactions/CLDKP_7_1700000001/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "state": "failed",
                "message": "Transaction not found"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let response = client
            .verify_transaction("CLDKP_7_1700000001")
            .await
            .unwrap();

        assert!(!response.is_successful());
        assert!(response.data.is_none());
        assert_eq!(response.first_unit_price(), None);
    }

    #[tokio::test]
    async fn test_verify_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client
            .verify_transaction("CLDKP_42_1700000000")
            .await
            .unwrap_err();

        match err {
            KlumpError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_verify_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client
            .verify_transaction("CLDKP_42_1700000000")
            .await
            .unwrap_err();

        assert!(matches!(err, KlumpError::Unauthorized));
    }

    #[tokio::test]
    async fn test_multibyte_body_logged_without_panic() {
        let mock_server = MockServer::start().await;

        // Body longer than the 200-char log preview, laid out so that byte
        // 200 falls inside a two-byte character. The JSON prefix up to the
        // message value is 30 bytes, so the accent starts at byte 199.
        let padding = "x".repeat(169);
        let body = format!(
            r#"{{"state":"success","message":"{padding}é and more text beyond the preview"}}"#
        );

        Mock::given(method("GET"))
            .and(path("/v1/transactions/CLDKP_42_1700000000/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);

        // Debug-level events must be enabled for the preview to be rendered.
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = client
            .verify_transaction("CLDKP_42_1700000000")
            .await
            .unwrap();

        assert!(response.is_successful());
        assert!(response.message.unwrap().ends_with("beyond the preview"));
    }

    #[tokio::test]
    async fn test_empty_reference_rejected() {
        let mock_server = MockServer::start().await;
        let client = create_test_client(&mock_server);

        let err = client.verify_transaction("  ").await.unwrap_err();
        assert!(matches!(err, KlumpError::EmptyReference));
    }

    #[test]
    fn test_verify_url_encodes_reference() {
        let client =
            KlumpClient::new("sk", "https://api.useklump.com/", Duration::from_secs(5)).unwrap();

        assert_eq!(
            client.verify_url("CLDKP_42_1700000000"),
            "https://api.useklump.com/v1/transactions/CLDKP_42_1700000000/verify"
        );
        assert_eq!(
            client.verify_url("ref with/slash"),
            "https://api.useklump.com/v1/transactions/ref%20with%2Fslash/verify"
        );
    }
}
