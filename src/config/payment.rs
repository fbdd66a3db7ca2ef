//! Stripe credentials

use serde::Deserialize;

use super::error::ValidationError;

/// Stripe account settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// `sk_test_...` or `sk_live_...`
    pub stripe_secret_key: String,

    /// Endpoint signing secret, `whsec_...`
    pub stripe_webhook_secret: String,

    /// Point the adapter somewhere other than api.stripe.com
    pub stripe_api_base_url: Option<String>,

    /// Refuse webhook events whose `livemode` is false
    #[serde(default)]
    pub require_livemode: bool,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.stripe_secret_key.starts_with("sk_test_")
    }

    pub fn is_live_mode(&self) -> bool {
        self.stripe_secret_key.starts_with("sk_live_")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let key = required(&self.stripe_secret_key, "STRIPE_SECRET_KEY")?;
        let webhook_secret = required(&self.stripe_webhook_secret, "STRIPE_WEBHOOK_SECRET")?;

        // Publishable and restricted keys cannot create sessions
        if !key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        match self.stripe_api_base_url.as_deref() {
            Some(url) if !has_http_scheme(url) => Err(ValidationError::InvalidStripeBaseUrl),
            _ => Ok(()),
        }
    }
}

fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ValidationError> {
    match value.trim() {
        "" => Err(ValidationError::MissingRequired(name)),
        trimmed => Ok(trimmed),
    }
}

pub(super) fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
