//! Billing domain.
//!
//! Everything the bridge knows about subscriptions without talking to the
//! outside world: validated checkout inputs, the status vocabulary written to
//! profiles, the patch shape for a profile row, the Stripe event envelope and
//! the webhook signature check.

mod errors;
mod profile_patch;
mod stripe_event;
mod subscription_status;
mod values;
mod webhook_errors;
mod webhook_verifier;

pub use errors::BillingError;
pub use profile_patch::ProfilePatch;
pub use stripe_event::{
    BillingEvent, CheckoutCompleted, StripeEvent, StripeEventData, StripeEventType,
};
pub use subscription_status::SubscriptionStatus;
pub use values::{Email, PriceId};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
