//! HandlePaymentWebhookHandler - Command handler for Stripe subscription webhooks.
//!
//! Verification failures are the only errors returned to the caller. Once an
//! event is verified, anything that stops its profile update from landing is
//! logged and recorded in the dead-letter log, and the event is still
//! acknowledged.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::billing::{
    BillingEvent, CheckoutCompleted, Email, ProfilePatch, StripeEvent, SubscriptionStatus,
    WebhookError,
};
use crate::ports::{
    DeadLetterEntry, DeadLetterLog, DeadLetterStage, PaymentProvider, ProfileStore,
    ProfileUpdateOutcome,
};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Value of the `stripe-signature` header, if present.
    pub signature: Option<String>,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// The profile row was updated.
    ProfileUpdated {
        event_id: String,
        email: String,
        rows: usize,
    },
    /// The update could not be applied and was recorded for follow-up.
    DeadLettered {
        event_id: String,
        stage: DeadLetterStage,
    },
    /// Event type the bridge does not act on.
    Ignored { event_type: String },
}

/// Handler for processing payment provider webhooks.
pub struct HandlePaymentWebhookHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    profile_store: Arc<dyn ProfileStore>,
    dead_letter_log: Arc<dyn DeadLetterLog>,
}

/// A patch waiting for the email that selects its row.
struct PendingUpdate {
    patch: ProfilePatch,
    email: Result<Email, DeadLetterEntry>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        profile_store: Arc<dyn ProfileStore>,
        dead_letter_log: Arc<dyn DeadLetterLog>,
    ) -> Self {
        Self {
            payment_provider,
            profile_store,
            dead_letter_log,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Verify webhook signature and parse event
        let signature = cmd.signature.ok_or(WebhookError::MissingSignature)?;
        let event = self
            .payment_provider
            .verify_webhook(&cmd.payload, &signature)?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Received Stripe webhook"
        );

        // 2. Dispatch on event type
        let billing_event = match event.billing_event() {
            Ok(billing_event) => billing_event,
            Err(e) => {
                let entry = DeadLetterEntry::new(
                    &event,
                    DeadLetterStage::InvalidPayload,
                    format!("Event object could not be decoded: {e}"),
                );
                return Ok(self.dead_letter(entry).await);
            }
        };

        let now = Utc::now();
        let pending = match billing_event {
            BillingEvent::CheckoutCompleted(completed) => {
                Self::checkout_completed(&event, completed, now)
            }
            BillingEvent::SubscriptionUpdated {
                customer_id,
                subscription_id,
                status,
            } => {
                let patch = ProfilePatch::new(now)
                    .with_status(status)
                    .with_subscription_id(Some(subscription_id));
                self.with_customer_email(&event, &customer_id, patch).await
            }
            BillingEvent::SubscriptionDeleted { customer_id, .. } => {
                let patch = ProfilePatch::new(now)
                    .with_status(SubscriptionStatus::Canceled)
                    .clear_subscription_id();
                self.with_customer_email(&event, &customer_id, patch).await
            }
            BillingEvent::PaymentFailed { customer_id, .. } => {
                let patch = ProfilePatch::new(now).with_status(SubscriptionStatus::PastDue);
                self.with_customer_email(&event, &customer_id, patch).await
            }
            BillingEvent::Ignored { event_type } => {
                tracing::debug!(event_id = %event.id, %event_type, "Ignoring webhook event");
                return Ok(HandlePaymentWebhookResult::Ignored { event_type });
            }
        };

        // 3. Apply the patch
        let PendingUpdate { patch, email } = pending;
        let email = match email {
            Ok(email) => email,
            Err(entry) => return Ok(self.dead_letter(entry.with_patch(patch)).await),
        };

        Ok(self.apply(&event, email, patch).await)
    }

    fn checkout_completed(
        event: &StripeEvent,
        completed: CheckoutCompleted,
        now: DateTime<Utc>,
    ) -> PendingUpdate {
        // Ids absent from the session leave the existing columns alone
        let mut patch = ProfilePatch::new(now).with_status(SubscriptionStatus::Active);
        if let Some(customer_id) = completed.customer_id {
            patch = patch.with_customer_id(Some(customer_id));
        }
        if let Some(subscription_id) = completed.subscription_id {
            patch = patch.with_subscription_id(Some(subscription_id));
        }
        if let Some(price_id) = completed.price_id {
            patch = patch.with_price_id(price_id);
        }

        let email = completed
            .email
            .as_deref()
            .and_then(|raw| Email::parse(raw).ok())
            .ok_or_else(|| {
                DeadLetterEntry::new(
                    event,
                    DeadLetterStage::MissingEmail,
                    "Checkout session carries no customer email",
                )
            });

        PendingUpdate { patch, email }
    }

    /// Resolve the profile email for a customer-scoped event.
    async fn with_customer_email(
        &self,
        event: &StripeEvent,
        customer_id: &str,
        patch: ProfilePatch,
    ) -> PendingUpdate {
        let email = match self.payment_provider.get_customer(customer_id).await {
            Ok(Some(customer)) => customer
                .email
                .as_deref()
                .and_then(|raw| Email::parse(raw).ok())
                .ok_or_else(|| {
                    DeadLetterEntry::new(
                        event,
                        DeadLetterStage::MissingEmail,
                        format!("Customer {customer_id} has no email"),
                    )
                }),
            Ok(None) => Err(DeadLetterEntry::new(
                event,
                DeadLetterStage::CustomerLookup,
                format!("Customer {customer_id} not found"),
            )),
            Err(e) => Err(DeadLetterEntry::new(
                event,
                DeadLetterStage::CustomerLookup,
                format!("Customer {customer_id} lookup failed: {e}"),
            )),
        };

        PendingUpdate { patch, email }
    }

    async fn apply(
        &self,
        event: &StripeEvent,
        email: Email,
        patch: ProfilePatch,
    ) -> HandlePaymentWebhookResult {
        match self.profile_store.update_by_email(&email, &patch).await {
            Ok(ProfileUpdateOutcome::Updated { rows }) => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    status = patch.subscription_status.as_ref().map(SubscriptionStatus::as_str),
                    rows,
                    "Updated profile subscription"
                );
                HandlePaymentWebhookResult::ProfileUpdated {
                    event_id: event.id.clone(),
                    email: email.to_string(),
                    rows,
                }
            }
            Ok(ProfileUpdateOutcome::NoMatch) => {
                let entry = DeadLetterEntry::new(
                    event,
                    DeadLetterStage::ProfileNotFound,
                    "No profile matched the customer email",
                )
                .with_email(email.as_str())
                .with_patch(patch);
                self.dead_letter(entry).await
            }
            Err(e) => {
                let entry = DeadLetterEntry::new(
                    event,
                    DeadLetterStage::ProfileUpdate,
                    format!("Profile update failed: {e}"),
                )
                .with_email(email.as_str())
                .with_patch(patch);
                self.dead_letter(entry).await
            }
        }
    }

    async fn dead_letter(&self, entry: DeadLetterEntry) -> HandlePaymentWebhookResult {
        let result = HandlePaymentWebhookResult::DeadLettered {
            event_id: entry.event_id.clone(),
            stage: entry.stage,
        };

        if let Err(e) = self.dead_letter_log.record(entry).await {
            tracing::error!(error = %e, "Failed to record dead-letter entry");
        }

        result
    }
}
