//! The webhook envelope and the billing events read out of it.
//!
//! Stripe sends far more than the bridge needs. The envelope keeps `data.object`
//! untyped and [`StripeEvent::billing_event`] decodes only the four event
//! types that change a profile.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::subscription_status::SubscriptionStatus;

/// A webhook delivery as posted by Stripe.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// `evt_...`, stable across redeliveries
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix seconds
    #[serde(default)]
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// Checkout session, subscription or invoice depending on `type`
    pub object: serde_json::Value,
}

impl StripeEvent {
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from(self.event_type.as_str())
    }

    fn object_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }

    /// Extract the typed billing event this envelope carries.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when a handled event type carries an
    /// object missing the fields the bridge needs.
    pub fn billing_event(&self) -> Result<BillingEvent, serde_json::Error> {
        match self.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => {
                let session: CheckoutSessionObject = self.object_as()?;
                Ok(BillingEvent::CheckoutCompleted(session.into()))
            }
            StripeEventType::CustomerSubscriptionUpdated => {
                let sub: SubscriptionObject = self.object_as()?;
                Ok(BillingEvent::SubscriptionUpdated {
                    customer_id: sub.customer,
                    subscription_id: sub.id,
                    status: SubscriptionStatus::from_provider(&sub.status),
                })
            }
            StripeEventType::CustomerSubscriptionDeleted => {
                let sub: SubscriptionObject = self.object_as()?;
                Ok(BillingEvent::SubscriptionDeleted {
                    customer_id: sub.customer,
                    subscription_id: sub.id,
                })
            }
            StripeEventType::InvoicePaymentFailed => {
                let invoice: InvoiceObject = self.object_as()?;
                Ok(BillingEvent::PaymentFailed {
                    customer_id: invoice.customer,
                    invoice_id: invoice.id,
                })
            }
            StripeEventType::Unknown => Ok(BillingEvent::Ignored {
                event_type: self.event_type.clone(),
            }),
        }
    }
}

/// Event types that change a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    CheckoutSessionCompleted,
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    InvoicePaymentFailed,
    /// Acknowledged, nothing written
    Unknown,
}

impl StripeEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for StripeEventType {
    fn from(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            _ => Self::Unknown,
        }
    }
}

/// Typed view of a verified webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    CheckoutCompleted(CheckoutCompleted),
    SubscriptionUpdated {
        customer_id: String,
        subscription_id: String,
        status: SubscriptionStatus,
    },
    SubscriptionDeleted {
        customer_id: String,
        subscription_id: String,
    },
    PaymentFailed {
        customer_id: String,
        invoice_id: Option<String>,
    },
    Ignored {
        event_type: String,
    },
}

/// Data taken from a completed checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutCompleted {
    pub session_id: Option<String>,
    /// First non-empty of `customer_email`, `customer_details.email` and
    /// `metadata.email`.
    pub email: Option<String>,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
    /// `metadata.priceId`, attached when the session was created.
    pub price_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    id: Option<String>,
    customer: Option<String>,
    customer_email: Option<String>,
    customer_details: Option<CustomerDetails>,
    subscription: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    id: String,
    customer: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct InvoiceObject {
    id: Option<String>,
    customer: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<CheckoutSessionObject> for CheckoutCompleted {
    fn from(mut session: CheckoutSessionObject) -> Self {
        let email = non_empty(session.customer_email)
            .or_else(|| non_empty(session.customer_details.and_then(|d| d.email)))
            .or_else(|| non_empty(session.metadata.remove("email")));

        Self {
            session_id: session.id,
            email,
            customer_id: session.customer,
            subscription_id: session.subscription,
            price_id: non_empty(session.metadata.remove("priceId")),
        }
    }
}

/// Fixture events for tests. Defaults to an empty
/// `checkout.session.completed` created now.
#[cfg(test)]
pub struct StripeEventBuilder {
    event: serde_json::Value,
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self {
            event: serde_json::json!({
                "id": "evt_test_123",
                "type": "checkout.session.completed",
                "created": chrono::Utc::now().timestamp(),
                "data": { "object": {} },
                "livemode": false,
            }),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.event["id"] = id.into().into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event["type"] = event_type.into().into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.event["data"]["object"] = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        serde_json::from_value(self.event).unwrap()
    }
}
