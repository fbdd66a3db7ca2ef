//! Validated inputs for checkout.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::BillingError;

/// Customer email address used as the join key for profile rows.
///
/// Surrounding whitespace is removed; anything else is kept verbatim because
/// the profile store matches on exact equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, BillingError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BillingError::MissingCheckoutFields);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stripe price identifier (`price_...`) selecting the plan being bought.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceId(String);

impl PriceId {
    pub fn parse(raw: &str) -> Result<Self, BillingError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BillingError::MissingCheckoutFields);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PriceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed() {
        let email = Email::parse("  a@x.com \n").unwrap();
        assert_eq!(email.as_str(), "a@x.com");
    }

    #[test]
    fn email_keeps_case() {
        let email = Email::parse("Alice@Example.com").unwrap();
        assert_eq!(email.to_string(), "Alice@Example.com");
    }

    #[test]
    fn blank_email_is_rejected() {
        assert!(matches!(
            Email::parse("   "),
            Err(BillingError::MissingCheckoutFields)
        ));
        assert!(Email::parse("").is_err());
    }

    #[test]
    fn price_id_is_trimmed() {
        let price = PriceId::parse(" price_123 ").unwrap();
        assert_eq!(price.as_str(), "price_123");
    }

    #[test]
    fn blank_price_id_is_rejected() {
        assert!(matches!(
            PriceId::parse("\t"),
            Err(BillingError::MissingCheckoutFields)
        ));
    }

    #[test]
    fn serializes_as_plain_string() {
        let email = Email::parse("a@x.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"a@x.com\"");
    }
}
