//! Subscription status written to profile rows.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Subscription status as stored in `profiles.subscription_status`.
///
/// The three statuses the bridge sets on its own are named variants. Any other
/// value reported by Stripe (`trialing`, `unpaid`, `incomplete`, ...) is passed
/// through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
    Other(String),
}

impl SubscriptionStatus {
    /// Parse a Stripe subscription status string.
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "active" => Self::Active,
            "past_due" => Self::PastDue,
            "canceled" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Other(raw) => raw,
        }
    }

    /// Returns true if Stripe still bills and serves this subscription.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active) || matches!(self, Self::Other(s) if s == "trialing")
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SubscriptionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SubscriptionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_provider(&raw))
    }
}
