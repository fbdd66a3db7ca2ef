//! Dead-letter log port.
//!
//! A webhook is always acknowledged once its signature checks out. When the
//! profile update it implies cannot be applied, an entry is recorded here so
//! the gap can be found and repaired later.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::billing::{ProfilePatch, StripeEvent};

/// Port for recording unapplied webhook updates.
#[async_trait]
pub trait DeadLetterLog: Send + Sync {
    async fn record(&self, entry: DeadLetterEntry) -> Result<(), DeadLetterError>;
}

/// Where in processing a webhook was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterStage {
    /// The event object lacked fields the handler needs.
    InvalidPayload,
    /// Looking up the Stripe customer failed or found nothing.
    CustomerLookup,
    /// No email could be determined for the event.
    MissingEmail,
    /// The profile store call failed.
    ProfileUpdate,
    /// The update succeeded but no profile has that email.
    ProfileNotFound,
}

impl DeadLetterStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadLetterStage::InvalidPayload => "invalid_payload",
            DeadLetterStage::CustomerLookup => "customer_lookup",
            DeadLetterStage::MissingEmail => "missing_email",
            DeadLetterStage::ProfileUpdate => "profile_update",
            DeadLetterStage::ProfileNotFound => "profile_not_found",
        }
    }
}

/// One unapplied webhook update.
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetterEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub event_id: String,
    pub event_type: String,
    pub stage: DeadLetterStage,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<ProfilePatch>,
}

impl DeadLetterEntry {
    pub fn new(event: &StripeEvent, stage: DeadLetterStage, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            event_id: event.id.clone(),
            event_type: event.event_type.clone(),
            stage,
            reason: reason.into(),
            email: None,
            patch: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_patch(mut self, patch: ProfilePatch) -> Self {
        self.patch = Some(patch);
        self
    }
}

/// Errors recording a dead-letter entry.
#[derive(Debug, Error)]
pub enum DeadLetterError {
    #[error("Failed to write dead-letter entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize dead-letter entry: {0}")]
    Serialization(#[from] serde_json::Error),
}
