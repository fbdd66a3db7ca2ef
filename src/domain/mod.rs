//! Domain layer containing billing types and rules.
//!
//! # Module Organization
//!
//! - `billing` - Checkout inputs, subscription status, profile patches and
//!   Stripe webhook verification

pub mod billing;
