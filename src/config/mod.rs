//! Typed configuration read from the environment.
//!
//! Every setting is an environment variable under the `SUBSCRIPTION_BRIDGE`
//! prefix, with `__` separating nested keys. A `.env` file in the working
//! directory is read first when present.
//!
//! # Example
//!
//! ```no_run
//! use subscription_bridge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod dead_letter;
mod error;
mod payment;
mod profile_store;
mod server;

pub use dead_letter::DeadLetterConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use profile_store::ProfileStoreConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "SUBSCRIPTION_BRIDGE";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Stripe credentials
    pub payment: PaymentConfig,

    /// PostgREST (Supabase) profile table
    pub profile_store: ProfileStoreConfig,

    /// Where unapplied webhook updates are recorded
    #[serde(default)]
    pub dead_letter: DeadLetterConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// `SUBSCRIPTION_BRIDGE__PAYMENT__STRIPE_SECRET_KEY=sk_...` becomes
    /// `payment.stripe_secret_key`. Scalars are parsed from their string form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoadError`] when a required section is absent
    /// or a value does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Environment::default()
            .prefix(ENV_PREFIX)
            .separator("__");

        Ok(config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?)
    }

    /// Check every section, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.payment.validate()?;
        self.profile_store.validate(&self.server.environment)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
