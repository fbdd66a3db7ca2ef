//! Partial update for a profile row.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::subscription_status::SubscriptionStatus;

/// Fields one webhook writes to a profile row.
///
/// Each nullable column is tri-state: `None` leaves the column untouched (the
/// key is omitted from the JSON body), `Some(None)` clears it to `null`, and
/// `Some(Some(v))` sets it. `updated_at` is always written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<SubscriptionStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_customer_id: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_subscription_id: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_price_id: Option<Option<String>>,

    pub updated_at: DateTime<Utc>,
}

impl ProfilePatch {
    /// An empty patch that only bumps `updated_at`.
    pub fn new(updated_at: DateTime<Utc>) -> Self {
        Self {
            subscription_status: None,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            stripe_price_id: None,
            updated_at,
        }
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.subscription_status = Some(status);
        self
    }

    /// Set the customer id column; `None` writes `null`.
    pub fn with_customer_id(mut self, customer_id: Option<String>) -> Self {
        self.stripe_customer_id = Some(customer_id);
        self
    }

    /// Set the subscription id column; `None` writes `null`.
    pub fn with_subscription_id(mut self, subscription_id: Option<String>) -> Self {
        self.stripe_subscription_id = Some(subscription_id);
        self
    }

    pub fn clear_subscription_id(self) -> Self {
        self.with_subscription_id(None)
    }

    pub fn with_price_id(mut self, price_id: impl Into<String>) -> Self {
        self.stripe_price_id = Some(Some(price_id.into()));
        self
    }
}
