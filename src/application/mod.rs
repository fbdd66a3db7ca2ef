//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (checkout, webhook) are kept apart from query handlers
//! (subscription status).

pub mod handlers;

pub use handlers::{
    CheckSubscriptionHandler, CheckSubscriptionQuery, CheckSubscriptionResult,
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
