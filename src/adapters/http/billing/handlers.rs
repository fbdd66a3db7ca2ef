//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::{
    CheckSubscriptionHandler, CheckSubscriptionQuery, CreateCheckoutSessionCommand,
    CreateCheckoutSessionHandler, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
};
use crate::domain::billing::{BillingError, WebhookError};
use crate::ports::{DeadLetterLog, PaymentProvider, ProfileStore};

use super::dto::{
    CheckoutSessionResponse, CreateCheckoutSessionRequest, ErrorResponse,
    SubscriptionStatusParams, SubscriptionStatusResponse,
};

/// Header carrying Stripe's webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct BillingAppState {
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub profile_store: Arc<dyn ProfileStore>,
    pub dead_letter_log: Arc<dyn DeadLetterLog>,
    /// Used for checkout redirects when a request has no `Origin` header.
    pub public_app_url: Option<String>,
}

impl BillingAppState {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        profile_store: Arc<dyn ProfileStore>,
        dead_letter_log: Arc<dyn DeadLetterLog>,
    ) -> Self {
        Self {
            payment_provider,
            profile_store,
            dead_letter_log,
            public_app_url: None,
        }
    }

    pub fn with_public_app_url(mut self, url: Option<String>) -> Self {
        self.public_app_url = url;
        self
    }

    /// Create handlers on demand from the shared state.
    pub fn checkout_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(self.payment_provider.clone())
            .with_fallback_origin(self.public_app_url.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.payment_provider.clone(),
            self.profile_store.clone(),
            self.dead_letter_log.clone(),
        )
    }

    pub fn subscription_handler(&self) -> CheckSubscriptionHandler {
        CheckSubscriptionHandler::new(self.payment_provider.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout/session - Start a hosted subscription checkout
pub async fn create_checkout_session(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let request: CreateCheckoutSessionRequest =
        serde_json::from_slice(&body).map_err(|e| BillingApiError::MalformedBody(e.to_string()))?;

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = CreateCheckoutSessionCommand {
        email: request.email,
        price_id: request.price_id,
        origin,
    };

    let result = state.checkout_handler().handle(cmd).await?;

    Ok(Json(CheckoutSessionResponse { url: result.url }))
}

/// POST /api/webhooks/stripe - Handle Stripe webhook events
///
/// The body is taken as raw bytes because the signature covers them exactly.
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    state.webhook_handler().handle(cmd).await.map_err(|e| {
        if e.is_authentication_failure() {
            tracing::warn!(error = %e, "Rejected Stripe webhook");
        } else {
            tracing::info!(error = %e, "Malformed Stripe webhook");
        }
        BillingError::from(e)
    })?;

    Ok((StatusCode::OK, "ok"))
}

/// GET /api/subscriptions/status?customer_id=cus_... - Check active subscriptions
pub async fn get_subscription_status(
    State(state): State<BillingAppState>,
    Query(params): Query<SubscriptionStatusParams>,
) -> Result<impl IntoResponse, BillingApiError> {
    let query = CheckSubscriptionQuery {
        customer_id: params.customer_id,
    };

    let result = state.subscription_handler().handle(query).await?;

    Ok(Json(SubscriptionStatusResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
#[derive(Debug)]
pub enum BillingApiError {
    Billing(BillingError),
    /// Request body was not the expected JSON.
    MalformedBody(String),
}

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self::Billing(err)
    }
}

impl From<WebhookError> for BillingApiError {
    fn from(err: WebhookError) -> Self {
        Self::Billing(BillingError::Webhook(err))
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> Response {
        let err = match self {
            BillingApiError::MalformedBody(detail) => {
                tracing::debug!(error = %detail, "Rejected malformed request body");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new("Invalid JSON body")),
                )
                    .into_response();
            }
            BillingApiError::Billing(err) => err,
        };

        let status = match &err {
            BillingError::MissingCheckoutFields
            | BillingError::MissingRedirectOrigin
            | BillingError::MissingCustomerId => StatusCode::BAD_REQUEST,
            BillingError::CheckoutFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BillingError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
            // Webhook failures answer in plain text
            BillingError::Webhook(_) => {
                return (StatusCode::BAD_REQUEST, err.public_message()).into_response();
            }
        };

        (status, Json(ErrorResponse::new(err.public_message()))).into_response()
    }
}
