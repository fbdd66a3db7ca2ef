//! Subscription Bridge - Stripe subscriptions mirrored onto user profiles
//!
//! This crate creates hosted Stripe checkout sessions and applies Stripe
//! subscription webhooks to a PostgREST profile table, keyed by email.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
