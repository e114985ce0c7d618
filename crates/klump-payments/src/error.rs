//! Gateway error taxonomy.
//!
//! Every failure in the callback path is terminal for that request: the
//! processor threads a `Result` through each stage and the HTTP layer turns
//! the error into a single user-facing message via [`PaymentError::user_message`].

use klump_client::KlumpError;
use thiserror::Error;

/// Errors raised by the gateway core.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Gateway configuration could not be loaded or is incomplete.
    #[error("Configuration error: {0}")]
    ConfigLoadFailure(String),

    /// The gateway module is not activated.
    #[error("Module not activated")]
    ModuleInactive,

    /// Klump could not be reached (network, TLS, timeout).
    #[error("Klump unreachable: {0}")]
    ProviderUnreachable(String),

    /// Klump answered with a non-2xx status or an unparseable body.
    #[error("Invalid response from Klump: {0}")]
    ProviderResponseInvalid(String),

    /// The verification response carried no transaction payload.
    #[error("No transaction data for reference {0}")]
    MissingTransactionData(String),

    /// The callback named an invoice the host does not know.
    #[error("Invalid invoice ID: {0}")]
    InvalidInvoiceId(u64),

    /// A payment with this reference is already recorded
    /// (double-credit prevention).
    #[error("Transaction already recorded: {0}")]
    DuplicateTransaction(String),

    /// The invoice's billing currency could not be resolved. Raised loudly
    /// instead of silently skipping conversion, which would post the wrong
    /// amount.
    #[error("Could not resolve billing currency for invoice {0}")]
    CurrencyResolutionFailed(u64),

    /// The host ledger rejected the payment record.
    #[error("Settlement failed: {0}")]
    SettlementFailed(String),

    /// Checkout requested in a currency Klump does not support.
    #[error("Currency {0} is not supported")]
    UnsupportedCurrency(String),

    /// Checkout amount below the provider's loan minimum.
    #[error("Amount {amount} is below the minimum of {minimum}")]
    BelowMinimumAmount { amount: f64, minimum: f64 },

    /// Host ledger storage fault.
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Minimal human-readable message shown to the paying customer.
    ///
    /// Never exposes internal detail; the verification-failure message
    /// optionally names a support contact, mirroring the hosted gateway's
    /// behaviour.
    pub fn user_message(&self, support_contact: Option<&str>) -> String {
        match self {
            PaymentError::ModuleInactive => "Module Not Activated.".to_string(),
            PaymentError::MissingTransactionData(_) => match support_contact {
                Some(contact) => format!(
                    "Failed to verify transaction at the moment. Kindly send an email \
                     with your invoice ID and payment reference to {contact}."
                ),
                None => "Failed to verify transaction at the moment.".to_string(),
            },
            PaymentError::ProviderUnreachable(_) | PaymentError::ProviderResponseInvalid(_) => {
                "Failed to verify transaction.".to_string()
            }
            PaymentError::InvalidInvoiceId(_) => "Invalid invoice.".to_string(),
            PaymentError::DuplicateTransaction(_) => {
                "This payment has already been recorded.".to_string()
            }
            PaymentError::UnsupportedCurrency(code) => {
                format!("Selected ({code}) currency isn't supported.")
            }
            PaymentError::BelowMinimumAmount { minimum, .. } => {
                format!("Klump is only available for amounts from {minimum}.")
            }
            _ => "An error occurred processing your payment.".to_string(),
        }
    }
}

impl From<KlumpError> for PaymentError {
    fn from(err: KlumpError) -> Self {
        match err {
            KlumpError::EmptyReference => {
                PaymentError::MissingTransactionData("empty reference".to_string())
            }
            // A 5xx means the provider itself is down, not that it answered
            // with a bad shape.
            KlumpError::Api { status, message } if status >= 500 => {
                PaymentError::ProviderUnreachable(format!("{status} - {message}"))
            }
            e if e.is_transport() => PaymentError::ProviderUnreachable(e.to_string()),
            e => PaymentError::ProviderResponseInvalid(e.to_string()),
        }
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, PaymentError>;
