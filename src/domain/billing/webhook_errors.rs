//! Webhook error types for Stripe webhook handling.
//!
//! Every variant here means the request was not accepted as a genuine Stripe
//! delivery. Problems that happen after verification are not webhook errors;
//! they are logged and dead-lettered instead.

use thiserror::Error;

/// Errors that reject a webhook delivery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebhookError {
    /// The `stripe-signature` header was absent or not valid text.
    #[error("Missing stripe-signature header")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("No signatures found matching the expected signature for payload")]
    InvalidSignature,

    /// Webhook timestamp is older than the tolerance window (5 minutes).
    #[error("Timestamp outside the tolerance zone")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Timestamp is in the future")]
    InvalidTimestamp,

    /// Failed to parse the signature header or the JSON payload.
    #[error("Unable to parse payload: {0}")]
    ParseError(String),

    /// A test-mode event arrived while live mode is required.
    #[error("Test mode events are not accepted")]
    LivemodeRequired,
}

impl WebhookError {
    /// Returns true if the signature itself did not check out, as opposed to a
    /// malformed request.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }
}
