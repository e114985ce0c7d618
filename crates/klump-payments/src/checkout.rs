//! Checkout initiation.
//!
//! Builds the client-side trigger for the Klump widget: a placeholder div,
//! the widget script tag and a payload carrying the merchant reference that
//! the later callback echoes back to correlate the payment with its invoice.

use crate::config::GatewayConfig;
use crate::error::PaymentError;
use crate::types::MerchantReference;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// URL of the provider's checkout widget script.
const WIDGET_SCRIPT_URL: &str = "https://js.useklump.com/klump.js";

/// Everything needed to render a checkout trigger for one invoice.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub invoice_id: u64,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub customer_name: String,
    pub customer_email: String,
}

/// Payload handed to the Klump JS widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutPayload {
    #[serde(rename = "publicKey")]
    pub public_key: String,
    pub data: CheckoutData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutData {
    pub amount: f64,
    pub redirect_url: String,
    pub currency: String,
    pub merchant_reference: String,
    pub meta_data: CheckoutMetaData,
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutMetaData {
    pub customer: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

/// A rendered checkout trigger.
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    /// Merchant reference generated for this attempt.
    pub reference: MerchantReference,
    /// Widget payload, for callers that render their own markup.
    pub payload: CheckoutPayload,
    /// Ready-to-embed HTML/JS snippet.
    pub html: String,
}

/// Builds checkout triggers from gateway configuration.
#[derive(Clone)]
pub struct CheckoutInitiator {
    config: GatewayConfig,
}

impl CheckoutInitiator {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Build the checkout trigger for an invoice.
    ///
    /// Guards: the module must be active, the invoice currency supported
    /// and the amount at or above the provider's loan minimum.
    #[instrument(skip(self, request), fields(invoice_id = request.invoice_id))]
    pub fn build(&self, request: CheckoutRequest) -> Result<CheckoutPage, PaymentError> {
        if !self.config.enabled {
            return Err(PaymentError::ModuleInactive);
        }
        if !self.config.supports_currency(&request.currency) {
            return Err(PaymentError::UnsupportedCurrency(request.currency));
        }
        if request.amount < self.config.minimum_amount {
            return Err(PaymentError::BelowMinimumAmount {
                amount: request.amount,
                minimum: self.config.minimum_amount,
            });
        }

        let reference = MerchantReference::generate(request.invoice_id);
        let redirect_url = format!(
            "{}?invoice_id={}&trxref={}",
            self.config.callback_url(),
            request.invoice_id,
            reference
        );

        let payload = CheckoutPayload {
            public_key: self.config.credentials().public_key,
            data: CheckoutData {
                amount: request.amount,
                redirect_url: redirect_url.clone(),
                currency: request.currency,
                merchant_reference: reference.as_str().to_string(),
                meta_data: CheckoutMetaData {
                    customer: request.customer_name,
                    email: request.customer_email,
                },
                items: vec![CheckoutItem {
                    name: request.description,
                    unit_price: request.amount,
                    quantity: 1,
                }],
            },
        };

        let html = render_snippet(&payload, &redirect_url)?;

        Ok(CheckoutPage {
            reference,
            payload,
            html,
        })
    }
}

/// Render the widget trigger snippet around a serialized payload.
fn render_snippet(payload: &CheckoutPayload, redirect_url: &str) -> Result<String, PaymentError> {
    let payload_json = serde_json::to_string(payload)
        .map_err(|e| PaymentError::Internal(e.to_string()))?;

    Ok(format!(
        r#"<div id="klump__checkout"></div>
<script src="{WIDGET_SCRIPT_URL}" defer></script>
<script>
  const paymentButton = document.getElementById("klump__checkout");
  paymentButton.addEventListener("click", function(e) {{
    e.preventDefault();
    const payload = {payload_json};
    payload.onSuccess = (data) => {{
      window.location.href = "{redirect_url}&kref=" + data.reference + "&status=success";
    }};
    payload.onError = (data) => {{
      console.log(data);
    }};
    new Klump(payload);
  }});
</script>"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_config() -> GatewayConfig {
        GatewayConfig {
            enabled: true,
            test_public_key: "pk_test".into(),
            system_url: "https://billing.example.com".into(),
            ..GatewayConfig::default()
        }
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            invoice_id: 42,
            amount: 30_000.0,
            currency: "NGN".into(),
            description: "Invoice #42".into(),
            customer_name: "Ada Obi".into(),
            customer_email: "ada@example.com".into(),
        }
    }

    #[test]
    fn test_build_embeds_reference_and_public_key() {
        let page = CheckoutInitiator::new(enabled_config())
            .build(request())
            .unwrap();

        assert_eq!(page.payload.public_key, "pk_test");
        assert_eq!(page.reference.invoice_id(), Some(42));
        assert_eq!(
            page.payload.data.merchant_reference,
            page.reference.as_str()
        );
        assert!(page
            .payload
            .data
            .redirect_url
            .starts_with("https://billing.example.com/klump/verify-payment?invoice_id=42&trxref=CLDKP_42_"));
        assert!(page.html.contains("klump__checkout"));
        assert!(page.html.contains("js.useklump.com/klump.js"));
        assert!(page.html.contains(page.reference.as_str()));
    }

    #[test]
    fn test_build_rejects_inactive_module() {
        let initiator = CheckoutInitiator::new(GatewayConfig::default());
        let err = initiator.build(request()).unwrap_err();
        assert!(matches!(err, PaymentError::ModuleInactive));
    }

    #[test]
    fn test_build_rejects_unsupported_currency() {
        let mut req = request();
        req.currency = "USD".into();

        let err = CheckoutInitiator::new(enabled_config())
            .build(req)
            .unwrap_err();
        assert!(matches!(err, PaymentError::UnsupportedCurrency(_)));
    }

    #[test]
    fn test_build_rejects_below_minimum() {
        let mut req = request();
        req.amount = 10_000.0;

        let err = CheckoutInitiator::new(enabled_config())
            .build(req)
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentError::BelowMinimumAmount { amount, .. } if amount == 10_000.0
        ));
    }

    #[test]
    fn test_single_line_item() {
        let page = CheckoutInitiator::new(enabled_config())
            .build(request())
            .unwrap();

        assert_eq!(page.payload.data.items.len(), 1);
        assert_eq!(page.payload.data.items[0].unit_price, 30_000.0);
        assert_eq!(page.payload.data.items[0].quantity, 1);
    }
}
