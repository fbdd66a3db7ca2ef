//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the JSON request/response structure for the billing API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::CheckSubscriptionResult;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a subscription checkout.
///
/// Both fields are optional at this layer so that an absent field produces
/// the same 400 as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "priceId")]
    pub price_id: Option<String>,
}

/// Query string for the subscription status endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionStatusParams {
    #[serde(default)]
    pub customer_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response carrying the hosted checkout URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

/// Response for a subscription status check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionStatusResponse {
    pub customer_id: String,
    pub active: bool,
    pub subscription_ids: Vec<String>,
}

impl From<CheckSubscriptionResult> for SubscriptionStatusResponse {
    fn from(result: CheckSubscriptionResult) -> Self {
        Self {
            customer_id: result.customer_id,
            active: result.active,
            subscription_ids: result.subscription_ids,
        }
    }
}

/// Error body returned by the JSON endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
