//! Axum router configuration for billing endpoints.
//!
//! This module defines the route structure for billing-related API endpoints
//! and wires them to their corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout_session, get_subscription_status, handle_stripe_webhook, BillingAppState,
};

/// Create the checkout and subscription routes.
///
/// # Routes
/// - `POST /checkout/session` - Start a hosted subscription checkout
/// - `GET /subscriptions/status` - Check a customer's active subscriptions
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/checkout/session", post(create_checkout_session))
        .route("/subscriptions/status", get(get_subscription_status))
}

/// Create the Stripe webhook router.
///
/// Kept apart from the other billing routes since requests are authenticated
/// by signature, not by caller.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks (any other method gets 405)
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Create the complete billing module router, meant to be nested under `/api`.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use crate::adapters::http::billing::{billing_router, BillingAppState};
///
/// let app = Router::new()
///     .nest("/api", billing_router())
///     .with_state(app_state);
/// ```
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .merge(billing_routes())
        .nest("/webhooks", webhook_routes())
}
