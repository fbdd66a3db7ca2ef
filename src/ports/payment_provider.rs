//! Payment provider port.
//!
//! Everything the bridge asks of Stripe: hosted checkout sessions, customer
//! lookup, active subscription listing and webhook verification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::billing::{Email, PriceId, StripeEvent, SubscriptionStatus, WebhookError};

/// Port for the subscription payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Open a hosted checkout for a recurring subscription.
    ///
    /// The returned session carries the URL the browser is sent to.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Look up a customer by provider id.
    ///
    /// Unknown and deleted customers both come back as `None`.
    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>, PaymentError>;

    /// Subscriptions of the customer whose status is `active`.
    async fn list_active_subscriptions(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Subscription>, PaymentError>;

    /// Check the signature header against the raw body and decode the event.
    ///
    /// Purely local; no network call is made.
    fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> Result<StripeEvent, WebhookError>;
}

/// Inputs for a subscription checkout with a single line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Pre-filled on the hosted page and echoed into session metadata.
    pub email: Email,
    pub price_id: PriceId,
    pub success_url: String,
    pub cancel_url: String,
}

/// A created hosted checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Provider-side customer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    /// Email on file, if any.
    pub email: Option<String>,
}

/// Provider-side subscription record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub customer_id: String,
    pub status: SubscriptionStatus,
}

/// Failure talking to the payment provider.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    /// Stripe's own error code, e.g. `resource_missing`.
    pub provider_code: Option<String>,
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            retryable: code.is_retryable(),
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(self, provider_code: impl Into<String>) -> Self {
        Self {
            provider_code: Some(provider_code.into()),
            ..self
        }
    }

    /// The request never got a response.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// A response arrived but could not be used.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    /// Classify a non-success HTTP status from the provider.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            400 => PaymentErrorCode::InvalidRequest,
            401 | 403 => PaymentErrorCode::AuthenticationError,
            404 => PaymentErrorCode::NotFound,
            429 => PaymentErrorCode::RateLimitExceeded,
            500..=599 => PaymentErrorCode::ProviderUnavailable,
            _ => PaymentErrorCode::ProviderError,
        };
        Self::new(code, message)
    }
}

/// Coarse classification of a [`PaymentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    /// Unknown price, bad parameter.
    InvalidRequest,
    NotFound,
    RateLimitExceeded,
    /// The provider answered with a 5xx.
    ProviderUnavailable,
    /// Unexpected status or an unparseable body.
    ProviderError,
}

impl PaymentErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::AuthenticationError => "authentication_error",
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "not_found",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::ProviderError => "provider_error",
        }
    }

    /// Whether the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimitExceeded | Self::ProviderUnavailable
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
