//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `stripe` - Payment provider (Stripe REST API, plus a mock)
//! - `profile_store` - PostgREST profile table (plus an in-memory store)
//! - `dead_letter` - Sinks for webhook updates that could not be applied
//! - `http` - Axum routes exposing the application handlers

pub mod dead_letter;
pub mod http;
pub mod profile_store;
pub mod stripe;

pub use dead_letter::{FileDeadLetterLog, InMemoryDeadLetterLog, TracingDeadLetterLog};
pub use http::{app_router, BillingAppState};
pub use profile_store::{InMemoryProfileStore, PostgrestProfileStore};
pub use stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
