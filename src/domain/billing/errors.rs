//! Application-facing billing errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | MissingCheckoutFields | 400 |
//! | MissingRedirectOrigin | 400 |
//! | MissingCustomerId | 400 |
//! | Webhook | 400 |
//! | CheckoutFailed | 500 |
//! | ProviderUnavailable | 502 |

use thiserror::Error;

use super::webhook_errors::WebhookError;

/// Errors surfaced to HTTP callers.
///
/// Provider details are carried for logging only; the HTTP layer maps each
/// variant to a fixed public message.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Email and priceId are required")]
    MissingCheckoutFields,

    #[error("Origin header or configured public app URL is required")]
    MissingRedirectOrigin,

    #[error("customer_id is required")]
    MissingCustomerId,

    #[error("Failed to create checkout session: {0}")]
    CheckoutFailed(String),

    #[error("Subscription service unavailable: {0}")]
    ProviderUnavailable(String),

    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

impl BillingError {
    /// Message safe to return to clients.
    pub fn public_message(&self) -> String {
        match self {
            BillingError::MissingCheckoutFields
            | BillingError::MissingRedirectOrigin
            | BillingError::MissingCustomerId => self.to_string(),
            BillingError::CheckoutFailed(_) => "Failed to create checkout session".to_string(),
            BillingError::ProviderUnavailable(_) => "Subscription service unavailable".to_string(),
            BillingError::Webhook(err) => format!("Webhook Error: {}", err),
        }
    }
}
