//! Profile store port.
//!
//! The profile table is owned by another system. The bridge only ever issues
//! a partial update filtered by email equality.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::billing::{Email, ProfilePatch};

/// Port for writing subscription fields onto user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Apply `patch` to every profile whose email equals `email`.
    async fn update_by_email(
        &self,
        email: &Email,
        patch: &ProfilePatch,
    ) -> Result<ProfileUpdateOutcome, ProfileStoreError>;
}

/// What an update touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdateOutcome {
    /// At least one row matched and was updated.
    Updated { rows: usize },
    /// No profile has this email.
    NoMatch,
}

/// Errors from the profile store.
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("Profile store unreachable: {0}")]
    Network(String),

    #[error("Profile store rejected update ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Profile store returned an unexpected response: {0}")]
    InvalidResponse(String),
}
