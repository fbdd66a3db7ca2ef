//! PostgREST profile store.
//!
//! Issues `PATCH <url>/rest/v1/<table>?email=eq.<email>` with the service
//! role key and `Prefer: return=representation`, so the response body lists
//! the rows that were updated.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::ProfileStoreConfig;
use crate::domain::billing::{Email, ProfilePatch};
use crate::ports::{ProfileStore, ProfileStoreError, ProfileUpdateOutcome};

/// Profile store backed by a PostgREST endpoint.
pub struct PostgrestProfileStore {
    http_client: reqwest::Client,
    endpoint: String,
    service_role_key: SecretString,
}

impl PostgrestProfileStore {
    pub fn new(config: &ProfileStoreConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http_client: reqwest::Client, config: &ProfileStoreConfig) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/rest/v1/{}", config.base_url(), config.table),
            service_role_key: SecretString::new(config.service_role_key.clone()),
        }
    }
}

#[async_trait]
impl ProfileStore for PostgrestProfileStore {
    async fn update_by_email(
        &self,
        email: &Email,
        patch: &ProfilePatch,
    ) -> Result<ProfileUpdateOutcome, ProfileStoreError> {
        let key = self.service_role_key.expose_secret();

        let response = self
            .http_client
            .patch(&self.endpoint)
            .query(&[("email", format!("eq.{}", email))])
            .header("apikey", key.as_str())
            .bearer_auth(key)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| ProfileStoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProfileStoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ProfileStoreError::InvalidResponse(e.to_string()))?;

        if rows.is_empty() {
            Ok(ProfileUpdateOutcome::NoMatch)
        } else {
            Ok(ProfileUpdateOutcome::Updated { rows: rows.len() })
        }
    }
}
