//! Callback processing and settlement recording.
//!
//! One callback invocation walks
//! `Received -> Authenticated -> Verified -> Reconciled -> Settled`, and any
//! stage aborts the whole request by returning an error. There is no retry:
//! the provider-side transaction already either succeeded or failed before
//! the browser was redirected here.

use crate::config::{GatewayConfig, GATEWAY_NAME};
use crate::error::PaymentError;
use crate::host::{HostLedger, InvoicePayment, TransactionAttempt};
use crate::reconcile::CurrencyReconciler;
use crate::types::{CallbackOutcome, CallbackParams, SettlementOutcome};
use crate::verify::PaymentVerifier;
use klump_client::KlumpClient;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Orchestrates verification, reconciliation and settlement for one
/// provider callback.
#[derive(Clone)]
pub struct CallbackProcessor {
    config: GatewayConfig,
    verifier: PaymentVerifier,
    reconciler: CurrencyReconciler,
    ledger: Arc<dyn HostLedger>,
}

impl CallbackProcessor {
    pub fn new(
        config: GatewayConfig,
        client: Arc<KlumpClient>,
        ledger: Arc<dyn HostLedger>,
    ) -> Self {
        let verifier = PaymentVerifier::new(client);
        let reconciler = CurrencyReconciler::new(ledger.clone(), config.convert_to_currency);
        Self {
            config,
            verifier,
            reconciler,
            ledger,
        }
    }

    /// Process one callback invocation end to end.
    #[instrument(skip(self, params), fields(invoice_id = params.invoice_id, trxref = %params.trxref))]
    pub async fn process(&self, params: &CallbackParams) -> Result<CallbackOutcome, PaymentError> {
        if !self.config.enabled {
            return Err(PaymentError::ModuleInactive);
        }

        // Validate the callback invoice ID against the host before touching
        // anything else.
        let invoice = self.ledger.invoice(params.invoice_id).await?;

        // Duplicate callbacks for an already-settled reference are a benign
        // no-op: provider redirects are retried by browsers.
        if self.ledger.payment_exists(&params.trxref).await {
            info!("Reference {} already settled, skipping", params.trxref);
            return Ok(CallbackOutcome::AlreadySettled {
                invoice_id: invoice.id,
                redirect: self.config.invoice_url(invoice.id),
            });
        }

        // Authoritative state comes from the provider, never from the
        // client-supplied status parameter.
        let verified = self.verifier.verify(&params.kref).await?;

        self.ledger
            .log_transaction(TransactionAttempt::new(
                GATEWAY_NAME,
                serde_json::json!({
                    "invoice_id": params.invoice_id,
                    "trxref": params.trxref,
                    "kref": params.kref,
                    "status": params.status,
                }),
                verified.outcome.as_str(),
            ))
            .await;

        if verified.outcome == SettlementOutcome::Unsuccessful {
            warn!(
                "Transaction {} for invoice {} not successful, nothing recorded",
                params.kref, invoice.id
            );
            return Ok(CallbackOutcome::Declined {
                invoice_id: invoice.id,
            });
        }

        let amount = self
            .reconciler
            .reconcile(verified.amount, &verified.currency, invoice.id)
            .await?;

        self.ledger
            .add_payment(InvoicePayment {
                invoice_id: invoice.id,
                reference: params.trxref.clone(),
                amount,
                fee: 0.0,
                gateway: GATEWAY_NAME.to_string(),
            })
            .await
            .map_err(|e| match e {
                PaymentError::Ledger(msg) => PaymentError::SettlementFailed(msg),
                other => other,
            })?;

        info!(
            "Settled invoice {} with {} {} (ref {})",
            invoice.id, amount, verified.currency, params.trxref
        );

        Ok(CallbackOutcome::Settled {
            invoice_id: invoice.id,
            redirect: self.config.invoice_url(invoice.id),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
