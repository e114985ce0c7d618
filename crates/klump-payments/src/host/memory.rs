//! In-memory host ledger.

use super::{Currency, HostLedger, Invoice, InvoiceCurrency, InvoicePayment, TransactionAttempt};
use crate::error::PaymentError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct LedgerData {
    invoices: HashMap<u64, Invoice>,
    currencies: HashMap<u32, Currency>,
    payments: Vec<InvoicePayment>,
    paid_references: HashSet<String>,
    gateway_log: Vec<TransactionAttempt>,
}

/// In-memory [`HostLedger`] implementation.
///
/// Used by the standalone server and the integration tests. Real
/// deployments back this trait with the billing platform's database.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    data: RwLock<LedgerData>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an invoice.
    pub async fn add_invoice(&self, invoice: Invoice) {
        let mut data = self.data.write().await;
        data.invoices.insert(invoice.id, invoice);
    }

    /// Insert or replace a currency row.
    pub async fn add_currency(&self, currency: Currency) {
        let mut data = self.data.write().await;
        data.currencies.insert(currency.id, currency);
    }

    /// Payments recorded against an invoice.
    pub async fn payments_for(&self, invoice_id: u64) -> Vec<InvoicePayment> {
        let data = self.data.read().await;
        data.payments
            .iter()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect()
    }

    /// Full gateway log.
    pub async fn gateway_log(&self) -> Vec<TransactionAttempt> {
        let data = self.data.read().await;
        data.gateway_log.clone()
    }
}

#[async_trait]
impl HostLedger for MemoryLedger {
    async fn invoice(&self, invoice_id: u64) -> Result<Invoice, PaymentError> {
        let data = self.data.read().await;
        data.invoices
            .get(&invoice_id)
            .cloned()
            .ok_or(PaymentError::InvalidInvoiceId(invoice_id))
    }

    async fn invoice_currency(&self, invoice_id: u64) -> Result<InvoiceCurrency, PaymentError> {
        let data = self.data.read().await;
        let invoice = data
            .invoices
            .get(&invoice_id)
            .ok_or(PaymentError::CurrencyResolutionFailed(invoice_id))?;
        let currency = data
            .currencies
            .get(&invoice.currency_id)
            .ok_or(PaymentError::CurrencyResolutionFailed(invoice_id))?;

        Ok(InvoiceCurrency {
            invoice_id,
            currency_id: currency.id,
            currency_code: currency.code.clone(),
        })
    }

    async fn payment_exists(&self, reference: &str) -> bool {
        let data = self.data.read().await;
        data.paid_references.contains(reference)
    }

    async fn add_payment(&self, payment: InvoicePayment) -> Result<(), PaymentError> {
        let mut data = self.data.write().await;

        if data.paid_references.contains(&payment.reference) {
            return Err(PaymentError::DuplicateTransaction(payment.reference));
        }
        if !data.invoices.contains_key(&payment.invoice_id) {
            return Err(PaymentError::InvalidInvoiceId(payment.invoice_id));
        }

        info!(
            "Recording payment of {} against invoice {} (ref {})",
            payment.amount, payment.invoice_id, payment.reference
        );

        data.paid_references.insert(payment.reference.clone());
        data.payments.push(payment);

        Ok(())
    }

    async fn log_transaction(&self, attempt: TransactionAttempt) {
        debug!(
            "Gateway log: {} -> {}",
            attempt.gateway, attempt.status
        );
        let mut data = self.data.write().await;
        data.gateway_log.push(attempt);
    }

    async fn convert_amount(
        &self,
        amount: f64,
        from_code: &str,
        to_currency_id: u32,
    ) -> Result<f64, PaymentError> {
        let data = self.data.read().await;

        let from = data
            .currencies
            .values()
            .find(|c| c.code == from_code)
            .ok_or_else(|| PaymentError::Ledger(format!("unknown currency code {from_code}")))?;
        let to = data
            .currencies
            .get(&to_currency_id)
            .ok_or_else(|| PaymentError::Ledger(format!("unknown currency id {to_currency_id}")))?;

        // Rates are relative to the host base currency.
        let converted = amount / from.exchange_rate * to.exchange_rate;
        Ok((converted * 100.0).round() / 100.0)
    }
}
