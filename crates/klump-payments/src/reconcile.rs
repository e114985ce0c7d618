//! Currency reconciliation.

use crate::error::PaymentError;
use crate::host::HostLedger;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Normalizes a verified capture amount into the invoice's billing currency.
#[derive(Clone)]
pub struct CurrencyReconciler {
    ledger: Arc<dyn HostLedger>,
    convert_enabled: bool,
}

impl CurrencyReconciler {
    pub fn new(ledger: Arc<dyn HostLedger>, convert_enabled: bool) -> Self {
        Self {
            ledger,
            convert_enabled,
        }
    }

    /// Reconcile a verified amount against the invoice's billing currency.
    ///
    /// A no-op when conversion is disabled or the currencies already match.
    /// When enabled, a currency that cannot be resolved fails loudly with
    /// `CurrencyResolutionFailed` so that the wrong amount is never posted.
    #[instrument(skip(self))]
    pub async fn reconcile(
        &self,
        amount: f64,
        payment_currency: &str,
        invoice_id: u64,
    ) -> Result<f64, PaymentError> {
        if !self.convert_enabled {
            debug!("Currency conversion disabled, amount unchanged");
            return Ok(amount);
        }

        let invoice_currency = self.ledger.invoice_currency(invoice_id).await?;

        if invoice_currency.currency_code == payment_currency {
            return Ok(amount);
        }

        let converted = self
            .ledger
            .convert_amount(amount, payment_currency, invoice_currency.currency_id)
            .await?;

        info!(
            "Converted {} {} to {} {} for invoice {}",
            amount, payment_currency, converted, invoice_currency.currency_code, invoice_id
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{InvoiceCurrency, MockHostLedger};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_disabled_conversion_is_noop() {
        let mut ledger = MockHostLedger::new();
        ledger.expect_invoice_currency().never();

        let reconciler = CurrencyReconciler::new(Arc::new(ledger), false);
        let amount = reconciler.reconcile(30_000.0, "NGN", 42).await.unwrap();

        assert_eq!(amount, 30_000.0);
    }

    #[tokio::test]
    async fn test_same_currency_is_noop() {
        let mut ledger = MockHostLedger::new();
        ledger
            .expect_invoice_currency()
            .with(eq(42u64))
            .returning(|_| {
                Ok(InvoiceCurrency {
                    invoice_id: 42,
                    currency_id: 1,
                    currency_code: "NGN".into(),
                })
            });
        ledger.expect_convert_amount().never();

        let reconciler = CurrencyReconciler::new(Arc::new(ledger), true);
        let amount = reconciler.reconcile(30_000.0, "NGN", 42).await.unwrap();

        assert_eq!(amount, 30_000.0);
    }

    #[tokio::test]
    async fn test_differing_currency_converts() {
        let mut ledger = MockHostLedger::new();
        ledger.expect_invoice_currency().returning(|_| {
            Ok(InvoiceCurrency {
                invoice_id: 42,
                currency_id: 2,
                currency_code: "USD".into(),
            })
        });
        ledger
            .expect_convert_amount()
            .with(eq(30_000.0), eq("NGN"), eq(2u32))
            .returning(|_, _, _| Ok(19.5));

        let reconciler = CurrencyReconciler::new(Arc::new(ledger), true);
        let amount = reconciler.reconcile(30_000.0, "NGN", 42).await.unwrap();

        assert_eq!(amount, 19.5);
    }

    #[tokio::test]
    async fn test_unresolvable_currency_fails_loudly() {
        let mut ledger = MockHostLedger::new();
        ledger
            .expect_invoice_currency()
            .returning(|id| Err(PaymentError::CurrencyResolutionFailed(id)));

        let reconciler = CurrencyReconciler::new(Arc::new(ledger), true);
        let err = reconciler.reconcile(30_000.0, "NGN", 42).await.unwrap_err();

        assert!(matches!(err, PaymentError::CurrencyResolutionFailed(42)));
    }
}
