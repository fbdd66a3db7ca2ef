//! Profile store configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::payment::has_http_scheme;
use super::server::Environment;

/// PostgREST profile table access (Supabase REST endpoint)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileStoreConfig {
    /// Project base URL, e.g. `https://<project>.supabase.co`
    pub url: String,

    /// Service role key, sent as both `apikey` and bearer token
    pub service_role_key: String,

    /// Table holding the profile rows
    #[serde(default = "default_table")]
    pub table: String,
}

impl ProfileStoreConfig {
    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Validate profile store configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("PROFILE_STORE_URL"));
        }
        if self.service_role_key.is_empty() {
            return Err(ValidationError::MissingRequired("PROFILE_STORE_SERVICE_ROLE_KEY"));
        }
        if !has_http_scheme(&self.url) {
            return Err(ValidationError::InvalidProfileStoreUrl);
        }
        if *environment == Environment::Production && !self.url.starts_with("https://") {
            return Err(ValidationError::ProfileStoreMustBeHttps);
        }
        let table_ok = !self.table.is_empty()
            && self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !table_ok {
            return Err(ValidationError::InvalidProfileTable(self.table.clone()));
        }
        Ok(())
    }
}

fn default_table() -> String {
    "profiles".to_string()
}
