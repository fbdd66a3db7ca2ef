//! Stripe behind the `PaymentProvider` port.
//!
//! [`StripePaymentAdapter`] talks to the REST API with form-encoded requests
//! and verifies webhooks locally. [`MockPaymentProvider`] is the in-process
//! double used by handler and router tests.

mod api_types;
mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
