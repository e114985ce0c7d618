//! Klump BNPL Payment Gateway
//!
//! Integrates the Klump "buy now, pay later" provider into a billing
//! platform: a client-side checkout trigger is rendered on an invoice page,
//! and the resulting transaction is verified server-side via a callback
//! endpoint that queries the provider's API and records payment against the
//! invoice.
//!
//! # Flow
//!
//! ```text
//! Invoice page -> Klump widget -> browser redirect to callback
//!     -> verify with Klump API -> reconcile currency -> record payment
//!     -> redirect to invoice view
//! ```
//!
//! # Modules
//!
//! - [`config`] - gateway configuration and credential-pair selection
//! - [`checkout`] - checkout trigger and merchant-reference generation
//! - [`verify`] - authoritative transaction verification
//! - [`reconcile`] - currency reconciliation against the invoice currency
//! - [`settle`] - the per-callback state machine and settlement recording
//! - [`host`] - the billing-platform ledger boundary
//! - [`api`] - HTTP endpoints (callback, checkout page, health)
//!
//! # Idempotence
//!
//! At most one payment record is ever created per external reference:
//! duplicate provider callbacks short-circuit as benign no-ops, and the
//! host ledger rejects any duplicate that slips past the pre-check.

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod host;
pub mod reconcile;
pub mod settle;
pub mod types;
pub mod verify;

// Re-exports for convenience
pub use checkout::{CheckoutInitiator, CheckoutPage, CheckoutRequest};
pub use config::{CredentialPair, GatewayConfig, GATEWAY_NAME};
pub use error::PaymentError;
pub use host::{HostLedger, Invoice, InvoicePayment, MemoryLedger};
pub use reconcile::CurrencyReconciler;
pub use settle::CallbackProcessor;
pub use types::{CallbackOutcome, CallbackParams, MerchantReference, SettlementOutcome};
pub use verify::PaymentVerifier;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(!config.enabled);
        assert!(config.test_mode);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.api_base_url, "https://api.useklump.com");
    }
}
