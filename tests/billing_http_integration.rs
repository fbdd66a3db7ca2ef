//! Integration tests for the billing HTTP endpoints.
//!
//! These tests drive the complete application router:
//! 1. Checkout requests are validated and forwarded to the payment provider
//! 2. Webhooks are verified against a real HMAC signature
//! 3. Verified webhooks update profiles or land in the dead-letter log
//! 4. The PostgREST adapter receives the expected PATCH

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use subscription_bridge::adapters::{
    app_router, BillingAppState, InMemoryDeadLetterLog, InMemoryProfileStore,
    MockPaymentProvider, PostgrestProfileStore,
};
use subscription_bridge::config::{ProfileStoreConfig, ServerConfig};
use subscription_bridge::domain::billing::SubscriptionStatus;
use subscription_bridge::ports::{
    Customer, DeadLetterStage, PaymentError, ProfileStore, Subscription,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

const WEBHOOK_SECRET: &str = "whsec_integration_secret";

struct TestApp {
    provider: MockPaymentProvider,
    store: InMemoryProfileStore,
    dead_letters: InMemoryDeadLetterLog,
}

impl TestApp {
    fn new() -> Self {
        Self {
            provider: MockPaymentProvider::with_webhook_secret(WEBHOOK_SECRET),
            store: InMemoryProfileStore::new(),
            dead_letters: InMemoryDeadLetterLog::new(),
        }
    }

    fn router(&self) -> Router {
        self.router_with_store(Arc::new(self.store.clone()))
    }

    fn router_with_store(&self, store: Arc<dyn ProfileStore>) -> Router {
        let state = BillingAppState::new(
            Arc::new(self.provider.clone()),
            store,
            Arc::new(self.dead_letters.clone()),
        );
        app_router(state, &ServerConfig::default())
    }
}

fn sign(payload: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

fn webhook_request(payload: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhooks/stripe")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

fn signed_webhook(payload: &str) -> Request<Body> {
    webhook_request(payload, Some(sign(payload, Utc::now().timestamp())))
}

fn checkout_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/checkout/session")
        .header("content-type", "application/json")
        .header("origin", "https://app.example.com")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn event(event_type: &str, object: Value) -> String {
    json!({
        "id": "evt_integration_1",
        "object": "event",
        "type": event_type,
        "created": Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": object }
    })
    .to_string()
}

async fn read_body(response: axum::response::Response) -> (StatusCode, String) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn completed_checkout() -> String {
    event(
        "checkout.session.completed",
        json!({
            "id": "cs_1",
            "object": "checkout.session",
            "customer": "cus_1",
            "customer_email": "a@x.com",
            "subscription": "sub_1",
            "metadata": { "email": "a@x.com", "priceId": "price_1" }
        }),
    )
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn checkout_missing_price_is_rejected_without_provider_call() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(checkout_request(r#"{"email":"a@x.com"}"#))
        .await
        .unwrap();

    let (status, body) = read_body(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Email and priceId are required"}"#);
    assert!(!app.provider.was_called("create_checkout_session"));
}

#[tokio::test]
async fn checkout_creates_single_line_item_session() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(checkout_request(r#"{"email":"a@x.com","priceId":"price_1"}"#))
        .await
        .unwrap();

    let (status, body) = read_body(response).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["url"].is_string());

    let requests = app.provider.checkout_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].price_id.as_str(), "price_1");
    assert_eq!(
        requests[0].success_url,
        "https://app.example.com/success?session_id={CHECKOUT_SESSION_ID}"
    );
}

#[tokio::test]
async fn checkout_provider_failure_is_generic_500() {
    let app = TestApp::new();
    app.provider.set_method_error(
        "create_checkout_session",
        PaymentError::provider("No such price: 'price_404'"),
    );

    let response = app
        .router()
        .oneshot(checkout_request(r#"{"email":"a@x.com","priceId":"price_404"}"#))
        .await
        .unwrap();

    let (status, body) = read_body(response).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"Failed to create checkout session"}"#);
}

// =============================================================================
// Webhooks
// =============================================================================

#[tokio::test]
async fn webhook_with_invalid_signature_does_not_update() {
    let app = TestApp::new();
    app.store.insert_profile("a@x.com");
    let payload = completed_checkout();
    let timestamp = Utc::now().timestamp();
    let forged = format!("t={timestamp},v1={}", "0".repeat(64));

    let response = app
        .router()
        .oneshot(webhook_request(&payload, Some(forged)))
        .await
        .unwrap();

    let (status, body) = read_body(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("Webhook Error: "));
    assert!(app.store.updates().is_empty());
}

#[tokio::test]
async fn webhook_with_stale_timestamp_is_rejected() {
    let app = TestApp::new();
    let payload = completed_checkout();
    let stale = sign(&payload, Utc::now().timestamp() - 600);

    let response = app
        .router()
        .oneshot(webhook_request(&payload, Some(stale)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.updates().is_empty());
}

#[tokio::test]
async fn webhook_without_signature_header_is_rejected() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(webhook_request(&completed_checkout(), None))
        .await
        .unwrap();

    let (status, body) = read_body(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Webhook Error: Missing stripe-signature header");
}

#[tokio::test]
async fn webhook_rejects_non_post() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/webhooks/stripe")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn checkout_completed_activates_profile() {
    let app = TestApp::new();
    app.store.insert_profile("a@x.com");

    let response = app
        .router()
        .oneshot(signed_webhook(&completed_checkout()))
        .await
        .unwrap();

    let (status, body) = read_body(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let profile = app.store.profile("a@x.com").unwrap();
    assert_eq!(profile["subscription_status"], "active");
    assert_eq!(profile["stripe_customer_id"], "cus_1");
    assert_eq!(profile["stripe_subscription_id"], "sub_1");
    assert!(app.dead_letters.is_empty());
}

#[tokio::test]
async fn subscription_deleted_clears_subscription() {
    let app = TestApp::new();
    app.provider.add_customer(Customer {
        id: "cus_1".to_string(),
        email: Some("a@x.com".to_string()),
    });
    app.store.insert_profile("a@x.com");
    let payload = event(
        "customer.subscription.deleted",
        json!({ "id": "sub_1", "object": "subscription", "customer": "cus_1", "status": "canceled" }),
    );

    let response = app.router().oneshot(signed_webhook(&payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let profile = app.store.profile("a@x.com").unwrap();
    assert_eq!(profile["subscription_status"], "canceled");
    assert!(profile["stripe_subscription_id"].is_null());
}

#[tokio::test]
async fn unhandled_event_is_acknowledged_without_update() {
    let app = TestApp::new();
    let payload = event("customer.created", json!({ "id": "cus_1", "object": "customer" }));

    let response = app.router().oneshot(signed_webhook(&payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.updates().is_empty());
    assert!(app.dead_letters.is_empty());
}

#[tokio::test]
async fn downstream_failure_is_acknowledged_and_dead_lettered() {
    let app = TestApp::new();
    app.store.fail_with("connection refused");

    let response = app
        .router()
        .oneshot(signed_webhook(&completed_checkout()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let entries = app.dead_letters.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].stage, DeadLetterStage::ProfileUpdate);
    assert_eq!(entries[0].event_id, "evt_integration_1");
    assert_eq!(entries[0].email.as_deref(), Some("a@x.com"));
}

#[tokio::test]
async fn checkout_completed_patches_postgrest_by_email() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("email", "eq.a@x.com"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({
            "subscription_status": "active",
            "stripe_customer_id": "cus_1",
            "stripe_subscription_id": "sub_1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "email": "a@x.com" }])))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new();
    let store = PostgrestProfileStore::new(&ProfileStoreConfig {
        url: server.uri(),
        service_role_key: "service-key".to_string(),
        table: "profiles".to_string(),
    });

    let response = app
        .router_with_store(Arc::new(store))
        .oneshot(signed_webhook(&completed_checkout()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.dead_letters.is_empty());
}

// =============================================================================
// Subscription status and health
// =============================================================================

#[tokio::test]
async fn subscription_status_lists_active_subscriptions() {
    let app = TestApp::new();
    app.provider.add_subscription(Subscription {
        id: "sub_1".to_string(),
        customer_id: "cus_1".to_string(),
        status: SubscriptionStatus::Active,
    });

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/subscriptions/status?customer_id=cus_1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_body(response).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["customer_id"], "cus_1");
    assert_eq!(body["active"], true);
    assert_eq!(body["subscription_ids"], json!(["sub_1"]));
}

#[tokio::test]
async fn subscription_status_provider_failure_is_bad_gateway() {
    let app = TestApp::new();
    app.provider.set_method_error(
        "list_active_subscriptions",
        PaymentError::network("connection reset"),
    );

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/subscriptions/status?customer_id=cus_1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_body(response).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, r#"{"error":"Subscription service unavailable"}"#);
}

#[tokio::test]
async fn health_endpoint_is_up() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
