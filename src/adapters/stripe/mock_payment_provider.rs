//! In-process stand-in for Stripe.
//!
//! Holds customers, subscriptions and the next checkout session in memory,
//! records every call, and lets a test make any method fail. Webhook
//! verification can be skipped, done for real with a signing secret, or
//! forced to fail.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::billing::{StripeEvent, StripeWebhookVerifier, WebhookError};
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, Customer, PaymentError, PaymentProvider, Subscription,
};

/// Scriptable [`PaymentProvider`]. Clones share state.
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.add_customer(Customer { id: "cus_1".into(), email: Some("a@x.com".into()) });
/// mock.set_method_error("get_customer", PaymentError::network("down"));
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentProvider {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    customers: HashMap<String, Customer>,
    subscriptions: Vec<Subscription>,
    next_checkout: Option<CheckoutSession>,
    failures: HashMap<&'static str, PaymentError>,
    calls: Vec<MethodCall>,
    checkout_requests: Vec<CreateCheckoutRequest>,
    webhooks: WebhookMode,
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

#[derive(Clone, Default)]
enum WebhookMode {
    /// Ignore the signature, only decode the body.
    #[default]
    Unchecked,
    Verified(Arc<StripeWebhookVerifier>),
    Rejected,
}

const CREATE_CHECKOUT_SESSION: &str = "create_checkout_session";
const GET_CUSTOMER: &str = "get_customer";
const LIST_ACTIVE_SUBSCRIPTIONS: &str = "list_active_subscriptions";
const VERIFY_WEBHOOK: &str = "verify_webhook";

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify webhooks for real against `secret`.
    pub fn with_webhook_secret(secret: &str) -> Self {
        let mock = Self::new();
        mock.lock().webhooks = WebhookMode::Verified(Arc::new(StripeWebhookVerifier::new(secret)));
        mock
    }

    /// Fail every webhook with `InvalidSignature`.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.lock().webhooks = WebhookMode::Rejected;
        mock
    }

    pub fn add_customer(&self, customer: Customer) {
        self.lock().customers.insert(customer.id.clone(), customer);
    }

    pub fn add_subscription(&self, subscription: Subscription) {
        self.lock().subscriptions.push(subscription);
    }

    /// Session returned by the next checkout; a generated one otherwise.
    pub fn set_checkout_session(&self, session: CheckoutSession) {
        self.lock().next_checkout = Some(session);
    }

    /// Make `method` return `error` until [`clear_errors`](Self::clear_errors).
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        let Some(method) = [CREATE_CHECKOUT_SESSION, GET_CUSTOMER, LIST_ACTIVE_SUBSCRIPTIONS]
            .into_iter()
            .find(|known| *known == method)
        else {
            panic!("MockPaymentProvider has no fallible method named {method}");
        };
        self.lock().failures.insert(method, error);
    }

    pub fn clear_errors(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self) -> Vec<MethodCall> {
        self.lock().calls.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.method == method).count()
    }

    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.lock().checkout_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Record the call, then return the injected failure for it, if any.
    fn enter(
        &self,
        method: &'static str,
        args: Vec<String>,
    ) -> Result<MutexGuard<'_, MockState>, PaymentError> {
        let mut state = self.lock();
        state.calls.push(MethodCall {
            method: method.to_string(),
            args,
        });
        match state.failures.get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let args = vec![request.email.to_string(), request.price_id.to_string()];
        let mut state = self.lock();
        state.checkout_requests.push(request);
        drop(state);

        let mut state = self.enter(CREATE_CHECKOUT_SESSION, args)?;
        Ok(state.next_checkout.take().unwrap_or_else(|| {
            let id = format!("cs_mock_{}", uuid::Uuid::new_v4().simple());
            CheckoutSession {
                url: format!("https://checkout.stripe.com/c/pay/{id}"),
                id,
            }
        }))
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>, PaymentError> {
        let state = self.enter(GET_CUSTOMER, vec![customer_id.to_string()])?;
        Ok(state.customers.get(customer_id).cloned())
    }

    async fn list_active_subscriptions(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Subscription>, PaymentError> {
        let state = self.enter(LIST_ACTIVE_SUBSCRIPTIONS, vec![customer_id.to_string()])?;
        Ok(state
            .subscriptions
            .iter()
            .filter(|s| s.customer_id == customer_id && s.status.is_active())
            .cloned()
            .collect())
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<StripeEvent, WebhookError> {
        let mode = {
            let mut state = self.lock();
            state.calls.push(MethodCall {
                method: VERIFY_WEBHOOK.to_string(),
                args: vec![signature.to_string()],
            });
            state.webhooks.clone()
        };

        match mode {
            WebhookMode::Unchecked => serde_json::from_slice(payload)
                .map_err(|e| WebhookError::ParseError(e.to_string())),
            WebhookMode::Verified(verifier) => verifier.verify_and_parse(payload, signature),
            WebhookMode::Rejected => Err(WebhookError::InvalidSignature),
        }
    }
}
