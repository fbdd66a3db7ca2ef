//! Configuration errors

use thiserror::Error;

/// Failure to produce a usable [`AppConfig`](super::AppConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is missing or does not parse
    #[error("failed to read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A setting that loaded but cannot be used.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingRequired(&'static str),

    #[error("server port must be non-zero")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("cannot bind to {0}")]
    InvalidSocketAddr(String),

    #[error("public app URL must start with http:// or https://")]
    InvalidPublicAppUrl,

    #[error("Stripe secret key must start with sk_")]
    InvalidStripeKey,

    #[error("Stripe webhook secret must start with whsec_")]
    InvalidStripeWebhookSecret,

    #[error("Stripe API base URL must start with http:// or https://")]
    InvalidStripeBaseUrl,

    #[error("profile store URL must start with http:// or https://")]
    InvalidProfileStoreUrl,

    #[error("profile store URL must use https in production")]
    ProfileStoreMustBeHttps,

    #[error("profile table name {0:?} is not a plain identifier")]
    InvalidProfileTable(String),
}
