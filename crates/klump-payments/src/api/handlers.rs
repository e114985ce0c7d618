//! HTTP handlers for the gateway endpoints.

use super::types::*;
use crate::checkout::{CheckoutInitiator, CheckoutRequest};
use crate::config::GatewayConfig;
use crate::error::PaymentError;
use crate::host::HostLedger;
use crate::settle::CallbackProcessor;
use crate::types::{CallbackOutcome, CallbackParams};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use klump_client::KlumpClient;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state for handlers.
pub struct AppState {
    pub processor: CallbackProcessor,
    pub initiator: CheckoutInitiator,
    pub ledger: Arc<dyn HostLedger>,
    pub client: Arc<KlumpClient>,
    pub config: GatewayConfig,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        client: Arc<KlumpClient>,
        ledger: Arc<dyn HostLedger>,
    ) -> Self {
        let processor = CallbackProcessor::new(config.clone(), client.clone(), ledger.clone());
        let initiator = CheckoutInitiator::new(config.clone());
        Self {
            processor,
            initiator,
            ledger,
            client,
            config,
        }
    }
}

/// Create the gateway router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/klump/verify-payment", get(verify_payment))
        .route("/klump/invoices/:id/pay", get(pay_invoice))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let provider_reachable = state.client.health_check().await;

    Json(HealthResponse {
        healthy: provider_reachable,
        gateway_enabled: state.config.enabled,
        test_mode: state.config.test_mode,
        provider_reachable,
    })
}

/// Provider callback: verify the transaction and settle the invoice.
///
/// The browser lands here after the Klump widget completes; on success the
/// user is redirected to the invoice view page.
async fn verify_payment(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match state.processor.process(&params).await {
        Ok(CallbackOutcome::Settled { redirect, .. })
        | Ok(CallbackOutcome::AlreadySettled { redirect, .. }) => {
            Redirect::to(&redirect).into_response()
        }
        Ok(CallbackOutcome::Declined { invoice_id }) => {
            info!("Callback for invoice {invoice_id} declined");
            Html(notice_page(&format!(
                "Your payment was not successful. \
                 <a href=\"{}\">Return to your invoice</a> to try again.",
                state.config.invoice_url(invoice_id)
            )))
            .into_response()
        }
        Err(e) => {
            error!("Callback processing failed: {e}");
            let message = e.user_message(state.config.support_email.as_deref());
            (status_for(&e), Html(notice_page(&message))).into_response()
        }
    }
}

/// Render the checkout trigger page for an invoice.
async fn pay_invoice(
    State(state): State<Arc<AppState>>,
    Path(invoice_id): Path<u64>,
) -> Result<Html<String>, (StatusCode, Json<ErrorResponse>)> {
    let invoice = state
        .ledger
        .invoice(invoice_id)
        .await
        .map_err(reject)?;
    let currency = state
        .ledger
        .invoice_currency(invoice_id)
        .await
        .map_err(reject)?;

    let page = state
        .initiator
        .build(CheckoutRequest {
            invoice_id: invoice.id,
            amount: invoice.amount,
            currency: currency.currency_code,
            description: invoice.description,
            customer_name: invoice.client_name,
            customer_email: invoice.client_email,
        })
        .map_err(reject)?;

    Ok(Html(page.html))
}

/// Minimal user-facing notice, styled like the host's error labels.
fn notice_page(message: &str) -> String {
    format!(
        "<div class='label label-lg label-danger' \
         style='max-width: 100% !important; white-space: inherit'>{message}</div>"
    )
}

/// HTTP status for a terminal callback error.
fn status_for(err: &PaymentError) -> StatusCode {
    match err {
        PaymentError::ModuleInactive => StatusCode::SERVICE_UNAVAILABLE,
        PaymentError::InvalidInvoiceId(_)
        | PaymentError::DuplicateTransaction(_)
        | PaymentError::MissingTransactionData(_)
        | PaymentError::UnsupportedCurrency(_)
        | PaymentError::BelowMinimumAmount { .. } => StatusCode::BAD_REQUEST,
        PaymentError::ProviderUnreachable(_) | PaymentError::ProviderResponseInvalid(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Stable machine-readable code for a gateway error.
fn code_for(err: &PaymentError) -> &'static str {
    match err {
        PaymentError::ConfigLoadFailure(_) => "CONFIG_LOAD_FAILURE",
        PaymentError::ModuleInactive => "MODULE_INACTIVE",
        PaymentError::ProviderUnreachable(_) => "PROVIDER_UNREACHABLE",
        PaymentError::ProviderResponseInvalid(_) => "PROVIDER_RESPONSE_INVALID",
        PaymentError::MissingTransactionData(_) => "MISSING_TRANSACTION_DATA",
        PaymentError::InvalidInvoiceId(_) => "INVALID_INVOICE_ID",
        PaymentError::DuplicateTransaction(_) => "DUPLICATE_TX",
        PaymentError::CurrencyResolutionFailed(_) => "CURRENCY_RESOLUTION_FAILED",
        PaymentError::SettlementFailed(_) => "SETTLEMENT_FAILED",
        PaymentError::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
        PaymentError::BelowMinimumAmount { .. } => "BELOW_MINIMUM_AMOUNT",
        PaymentError::Ledger(_) => "LEDGER_ERROR",
        PaymentError::Internal(_) => "INTERNAL_ERROR",
    }
}

fn reject(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_for(&err),
        Json(ErrorResponse::new(err.user_message(None), code_for(&err))),
    )
}
