//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API.
//!
//! # Security
//!
//! - Webhook signatures are checked by [`StripeWebhookVerifier`]
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(secret_key, webhook_secret);
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::config::PaymentConfig;
use crate::domain::billing::{StripeEvent, StripeWebhookVerifier, SubscriptionStatus, WebhookError};
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, Customer, PaymentError, PaymentErrorCode,
    PaymentProvider, Subscription,
};

use super::api_types::{
    StripeCheckoutSession, StripeCustomer, StripeErrorResponse, StripeList, StripeSubscription,
};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Whether to reject test mode webhook events.
    require_livemode: bool,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            require_livemode: false,
        }
    }

    /// Build from the application's payment configuration.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        let mut stripe = Self::new(&config.stripe_secret_key, &config.stripe_webhook_secret)
            .with_require_livemode(config.require_livemode);
        if let Some(base_url) = &config.stripe_api_base_url {
            stripe = stripe.with_base_url(base_url);
        }
        stripe
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reject test mode webhook events.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
    verifier: StripeWebhookVerifier,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        let verifier = StripeWebhookVerifier::new(config.webhook_secret.expose_secret().clone())
            .with_require_livemode(config.require_livemode);
        Self {
            config,
            http_client: reqwest::Client::new(),
            verifier,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// Send a request and decode a 2xx JSON body.
    ///
    /// Non-2xx responses are turned into a `PaymentError` carrying Stripe's
    /// error message and code when the body has one.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PaymentError> {
        let response = request
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(stripe_error(status.as_u16(), &error_text));
        }

        response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

fn stripe_error(status: u16, body: &str) -> PaymentError {
    match serde_json::from_str::<StripeErrorResponse>(body) {
        Ok(parsed) => {
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| format!("Stripe API error ({})", status));
            let err = PaymentError::from_status(status, message);
            match parsed.error.code.or(parsed.error.error_type) {
                Some(code) => err.with_provider_code(code),
                None => err,
            }
        }
        Err(_) => PaymentError::from_status(status, format!("Stripe API error: {}", body)),
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = [
            ("mode", "subscription"),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price]", request.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("customer_email", request.email.as_str()),
            ("success_url", request.success_url.as_str()),
            ("cancel_url", request.cancel_url.as_str()),
            ("metadata[email]", request.email.as_str()),
            ("metadata[priceId]", request.price_id.as_str()),
        ];

        let session: StripeCheckoutSession = self
            .send(
                self.http_client
                    .post(self.endpoint("/v1/checkout/sessions"))
                    .form(&params),
            )
            .await?;

        let url = session.url.ok_or_else(|| {
            PaymentError::provider(format!("Checkout session {} has no URL", session.id))
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>, PaymentError> {
        let url = self.endpoint(&format!("/v1/customers/{}", customer_id));

        let result: Result<StripeCustomer, PaymentError> =
            self.send(self.http_client.get(url)).await;

        let customer = match result {
            Ok(customer) => customer,
            Err(err) if err.code == PaymentErrorCode::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        if customer.deleted {
            return Ok(None);
        }

        Ok(Some(Customer {
            id: customer.id,
            email: customer.email,
        }))
    }

    async fn list_active_subscriptions(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Subscription>, PaymentError> {
        let list: StripeList<StripeSubscription> = self
            .send(
                self.http_client
                    .get(self.endpoint("/v1/subscriptions"))
                    .query(&[("customer", customer_id), ("status", "active")]),
            )
            .await?;

        if list.has_more {
            tracing::debug!(customer_id, "More active subscriptions than one page");
        }

        Ok(list
            .data
            .into_iter()
            .map(|sub| Subscription {
                id: sub.id,
                customer_id: sub.customer,
                status: SubscriptionStatus::from_provider(&sub.status),
            })
            .collect())
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<StripeEvent, WebhookError> {
        self.verifier.verify_and_parse(payload, signature)
    }
}
