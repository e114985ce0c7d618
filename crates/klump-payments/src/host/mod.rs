//! Host billing-platform boundary.
//!
//! All durable state (invoices, payments, currencies) lives in the host
//! platform. [`HostLedger`] sketches the handful of primitives this gateway
//! consumes; [`MemoryLedger`] is an in-process implementation used by the
//! standalone server and the tests.

use crate::error::PaymentError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod memory;

pub use memory::MemoryLedger;

/// A host-owned invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Numeric invoice ID.
    pub id: u64,
    /// Owning client ID.
    pub user_id: u64,
    /// Balance due.
    pub amount: f64,
    /// Line description shown at checkout.
    pub description: String,
    /// Billing currency ID of the owning client.
    pub currency_id: u32,
    /// Client display name, used for checkout meta-data.
    pub client_name: String,
    /// Client email, used for checkout meta-data.
    pub client_email: String,
}

/// An invoice joined with its owning client's currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceCurrency {
    pub invoice_id: u64,
    pub currency_id: u32,
    pub currency_code: String,
}

/// A host currency row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub id: u32,
    /// ISO code, e.g. `NGN`.
    pub code: String,
    /// Exchange rate relative to the host's base currency.
    pub exchange_rate: f64,
}

/// A payment record applied to an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePayment {
    pub invoice_id: u64,
    /// External transaction reference. At most one payment record may ever
    /// exist per reference.
    pub reference: String,
    pub amount: f64,
    pub fee: f64,
    /// Gateway module name.
    pub gateway: String,
}

/// One audited callback attempt in the host's gateway log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionAttempt {
    pub gateway: String,
    /// Raw callback payload, for debugging.
    pub payload: serde_json::Value,
    /// `Successful` or `Unsuccessful`.
    pub status: String,
    pub at: DateTime<Utc>,
}

impl TransactionAttempt {
    pub fn new(gateway: impl Into<String>, payload: serde_json::Value, status: impl Into<String>) -> Self {
        Self {
            gateway: gateway.into(),
            payload,
            status: status.into(),
            at: Utc::now(),
        }
    }
}

/// Host ledger primitives consumed by the gateway.
///
/// The host owns concurrency and locking; this crate's only contract toward
/// it is to never call [`HostLedger::add_payment`] twice for the same
/// reference without the host detecting and rejecting the duplicate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostLedger: Send + Sync {
    /// Resolve an invoice by ID. `InvalidInvoiceId` when absent.
    async fn invoice(&self, invoice_id: u64) -> Result<Invoice, PaymentError>;

    /// Resolve an invoice joined with its billing currency.
    /// `CurrencyResolutionFailed` when the invoice or its currency is
    /// missing.
    async fn invoice_currency(&self, invoice_id: u64) -> Result<InvoiceCurrency, PaymentError>;

    /// Whether a payment record already exists for this reference.
    async fn payment_exists(&self, reference: &str) -> bool;

    /// Apply a payment record to an invoice. Idempotent on reference:
    /// a duplicate is rejected with `DuplicateTransaction`.
    async fn add_payment(&self, payment: InvoicePayment) -> Result<(), PaymentError>;

    /// Append an entry to the gateway log.
    async fn log_transaction(&self, attempt: TransactionAttempt);

    /// Convert an amount from one currency into another, rounded to the
    /// host's two-decimal display convention.
    async fn convert_amount(
        &self,
        amount: f64,
        from_code: &str,
        to_currency_id: u32,
    ) -> Result<f64, PaymentError>;
}
