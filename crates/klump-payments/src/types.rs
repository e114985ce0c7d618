//! Core types for the gateway.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Prefix of every merchant reference generated by this gateway.
pub const REFERENCE_PREFIX: &str = "CLDKP";

/// Merchant reference correlating a provider-side transaction with the
/// invoice that initiated it.
///
/// Format: `CLDKP_{invoiceId}_{unixTimestamp}`. Generated once per checkout
/// attempt and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantReference(String);

impl MerchantReference {
    /// Generate a fresh reference for an invoice.
    pub fn generate(invoice_id: u64) -> Self {
        Self(format!(
            "{REFERENCE_PREFIX}_{invoice_id}_{}",
            Utc::now().timestamp()
        ))
    }

    /// Wrap a reference echoed back by the provider.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Invoice ID embedded in the reference, if it has the expected shape.
    pub fn invoice_id(&self) -> Option<u64> {
        let mut parts = self.0.split('_');
        if parts.next() != Some(REFERENCE_PREFIX) {
            return None;
        }
        parts.next()?.parse().ok()
    }
}

impl std::fmt::Display for MerchantReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binary settlement outcome derived from the provider's state string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// Provider reports the transaction as captured.
    Successful,
    /// Anything other than `"success"`.
    Unsuccessful,
}

impl SettlementOutcome {
    /// Label used in the host's gateway log.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementOutcome::Successful => "Successful",
            SettlementOutcome::Unsuccessful => "Unsuccessful",
        }
    }
}

impl std::fmt::Display for SettlementOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction whose state was fetched from the provider.
#[derive(Debug, Clone)]
pub struct VerifiedTransaction {
    /// Provider-side reference that was verified.
    pub reference: String,
    /// Settlement outcome.
    pub outcome: SettlementOutcome,
    /// Declared capture amount: unit price of the first line item.
    /// Multi-item carts are out of scope for this gateway.
    pub amount: f64,
    /// Currency the payment was captured in.
    pub currency: String,
}

/// Query parameters of the provider's browser redirect to the callback URL.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    /// Host invoice the checkout was initiated for.
    pub invoice_id: u64,
    /// Merchant reference generated at checkout time.
    pub trxref: String,
    /// Provider's own transaction reference, used for verification.
    pub kref: String,
    /// Client-reported status. Never trusted for settlement decisions;
    /// kept for the audit log only.
    #[serde(default)]
    pub status: Option<String>,
}

/// Terminal outcome of one callback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Payment verified, reconciled and recorded; redirect to the invoice.
    Settled { invoice_id: u64, redirect: String },
    /// A payment with this reference already exists. Benign no-op so that
    /// provider redirect retries never double-credit.
    AlreadySettled { invoice_id: u64, redirect: String },
    /// Transaction verified but not successful: logged for audit, never paid.
    Declined { invoice_id: u64 },
}
