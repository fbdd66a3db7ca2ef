//! Billing handlers.
//!
//! ## Commands
//! - Creating hosted subscription checkout sessions
//! - Processing Stripe subscription webhooks
//!
//! ## Queries
//! - Checking whether a customer has an active subscription

mod check_subscription;
mod create_checkout_session;
mod handle_payment_webhook;

// Commands
pub use create_checkout_session::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};

// Queries
pub use check_subscription::{
    CheckSubscriptionHandler, CheckSubscriptionQuery, CheckSubscriptionResult,
};
