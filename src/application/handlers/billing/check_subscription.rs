//! CheckSubscriptionHandler - Query handler for a customer's active subscriptions.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::billing::BillingError;
use crate::ports::PaymentProvider;

/// Query for a customer's subscription state.
#[derive(Debug, Clone, Default)]
pub struct CheckSubscriptionQuery {
    pub customer_id: Option<String>,
}

/// Result of a subscription check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSubscriptionResult {
    pub customer_id: String,
    pub active: bool,
    pub subscription_ids: Vec<String>,
}

/// Handler asking Stripe whether a customer has any active subscription.
pub struct CheckSubscriptionHandler {
    payment_provider: Arc<dyn PaymentProvider>,
}

impl CheckSubscriptionHandler {
    pub fn new(payment_provider: Arc<dyn PaymentProvider>) -> Self {
        Self { payment_provider }
    }

    pub async fn handle(
        &self,
        query: CheckSubscriptionQuery,
    ) -> Result<CheckSubscriptionResult, BillingError> {
        let customer_id = query
            .customer_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(BillingError::MissingCustomerId)?;

        let subscriptions = self
            .payment_provider
            .list_active_subscriptions(&customer_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    customer_id = %customer_id,
                    code = ?e.code,
                    error = %e.message,
                    "Failed to list subscriptions"
                );
                BillingError::ProviderUnavailable(e.to_string())
            })?;

        Ok(CheckSubscriptionResult {
            active: !subscriptions.is_empty(),
            subscription_ids: subscriptions.into_iter().map(|s| s.id).collect(),
            customer_id,
        })
    }
}
