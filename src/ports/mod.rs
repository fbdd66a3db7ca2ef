//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - Stripe checkout, customer lookup, subscriptions and
//!   webhook verification
//! - `ProfileStore` - Partial updates of user profile rows keyed by email
//! - `DeadLetterLog` - Record of verified webhooks whose update was not applied

mod dead_letter;
mod payment_provider;
mod profile_store;

pub use dead_letter::{DeadLetterEntry, DeadLetterError, DeadLetterLog, DeadLetterStage};
pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, Customer, PaymentError, PaymentErrorCode,
    PaymentProvider, Subscription,
};
pub use profile_store::{ProfileStore, ProfileStoreError, ProfileUpdateOutcome};
