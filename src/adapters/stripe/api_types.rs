//! Wire shapes of the Stripe responses the adapter reads.
//!
//! Unlisted fields are skipped by serde.

use serde::Deserialize;

/// Body of `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,

    /// Only set while the session is `open`.
    pub url: Option<String>,
}

/// Body of `GET /v1/customers/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    pub id: String,

    pub email: Option<String>,

    /// Deleted customers come back as `{id, deleted: true}`.
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    pub id: String,

    pub customer: String,

    /// Kept as text; mapped to `SubscriptionStatus` by the adapter.
    pub status: String,
}

/// `{"object": "list", "data": [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    pub message: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}
