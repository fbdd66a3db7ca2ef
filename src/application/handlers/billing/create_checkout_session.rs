//! CreateCheckoutSessionHandler - Command handler for starting a subscription checkout.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Email, PriceId};
use crate::ports::{CreateCheckoutRequest, PaymentProvider};

/// Command to create a hosted checkout session.
///
/// Fields arrive straight from the request body, so either may be absent.
#[derive(Debug, Clone, Default)]
pub struct CreateCheckoutSessionCommand {
    pub email: Option<String>,
    pub price_id: Option<String>,
    /// Value of the request's `Origin` header.
    pub origin: Option<String>,
}

/// Result of a created checkout session.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    /// Provider-hosted page the browser is sent to.
    pub url: String,
}

/// Handler for creating subscription checkout sessions.
pub struct CreateCheckoutSessionHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    fallback_origin: Option<String>,
}

impl CreateCheckoutSessionHandler {
    pub fn new(payment_provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            payment_provider,
            fallback_origin: None,
        }
    }

    /// Origin used for redirect URLs when the request carries none.
    pub fn with_fallback_origin(mut self, origin: Option<String>) -> Self {
        self.fallback_origin = origin.and_then(normalize_origin);
        self
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, BillingError> {
        // 1. Validate input before touching the provider
        let email = Email::parse(cmd.email.as_deref().unwrap_or_default())?;
        let price_id = PriceId::parse(cmd.price_id.as_deref().unwrap_or_default())?;

        // 2. Resolve where the provider should send the browser back to
        let origin = cmd
            .origin
            .and_then(normalize_origin)
            .or_else(|| self.fallback_origin.clone())
            .ok_or(BillingError::MissingRedirectOrigin)?;

        let request = CreateCheckoutRequest {
            email,
            price_id,
            success_url: format!("{origin}/success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{origin}/cancel"),
        };

        // 3. Create the session; provider details stay in the logs
        let session = self
            .payment_provider
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::error!(
                    code = ?e.code,
                    provider_code = e.provider_code.as_deref(),
                    retryable = e.retryable,
                    error = %e.message,
                    "Failed to create checkout session"
                );
                BillingError::CheckoutFailed(e.to_string())
            })?;

        tracing::info!(session_id = %session.id, "Created checkout session");

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            url: session.url,
        })
    }
}

fn normalize_origin(raw: String) -> Option<String> {
    let origin = raw.trim().trim_end_matches('/');
    if origin.is_empty() || origin == "null" {
        None
    } else {
        Some(origin.to_string())
    }
}
