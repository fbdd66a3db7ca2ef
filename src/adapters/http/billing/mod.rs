//! HTTP adapter for billing endpoints.
//!
//! Exposes the billing domain via REST API:
//! - `POST /api/checkout/session` - Start a hosted subscription checkout
//! - `GET /api/subscriptions/status` - Check a customer's active subscriptions
//! - `POST /api/webhooks/stripe` - Handle Stripe webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{BillingApiError, BillingAppState, STRIPE_SIGNATURE_HEADER};
pub use routes::{billing_router, billing_routes, webhook_routes};
