//! Response types for the Klump transactions API.

use serde::{Deserialize, Serialize};

/// Provider state string that marks a settled transaction.
pub const STATE_SUCCESS: &str = "success";

/// Response body of `GET /v1/transactions/{reference}/verify`.
///
/// `data` is absent when the provider has no record of the reference or
/// returned an error shape; callers must treat that as a failed verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyTransactionResponse {
    /// Transaction state as reported by Klump (`"success"` or otherwise).
    #[serde(default)]
    pub state: String,

    /// Transaction payload; `None` when the provider found nothing.
    #[serde(default)]
    pub data: Option<TransactionData>,

    /// Optional human-readable message from the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Transaction payload returned by the verification endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    /// ISO currency code the payment was captured in.
    pub currency: String,

    /// Line items of the checkout. Single-item checkouts are the norm for
    /// invoice payments; the first item carries the settlement amount.
    #[serde(default)]
    pub items: Vec<LineItem>,

    /// Merchant reference echoed back by the provider, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_reference: Option<String>,
}

/// A single checkout line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub unit_price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl VerifyTransactionResponse {
    /// Whether the provider reports the transaction as settled.
    pub fn is_successful(&self) -> bool {
        self.state == STATE_SUCCESS
    }

    /// Unit price of the first line item, if any.
    pub fn first_unit_price(&self) -> Option<f64> {
        self.data
            .as_ref()
            .and_then(|d| d.items.first())
            .map(|item| item.unit_price)
    }
}
