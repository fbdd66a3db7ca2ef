//! In-memory profile store.
//!
//! Holds profile rows as JSON objects keyed by email and applies patches the
//! way PostgREST would: present keys overwrite, `null` clears, absent keys are
//! left alone. Every update attempt is recorded for assertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::billing::{Email, ProfilePatch};
use crate::ports::{ProfileStore, ProfileStoreError, ProfileUpdateOutcome};

#[derive(Default)]
struct State {
    rows: HashMap<String, Map<String, Value>>,
    updates: Vec<(Email, ProfilePatch)>,
    failure: Option<String>,
}

/// Profile store keeping rows in memory.
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a profile row with only its email set.
    pub fn insert_profile(&self, email: &str) {
        let mut row = Map::new();
        row.insert("email".to_string(), Value::String(email.to_string()));
        self.state
            .lock()
            .unwrap()
            .rows
            .insert(email.to_string(), row);
    }

    /// Current contents of a row.
    pub fn profile(&self, email: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .rows
            .get(email)
            .cloned()
            .map(Value::Object)
    }

    /// Every update attempted, whether or not a row matched.
    pub fn updates(&self) -> Vec<(Email, ProfilePatch)> {
        self.state.lock().unwrap().updates.clone()
    }

    /// Make every following update fail with a network error.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state.lock().unwrap().failure = Some(message.into());
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn update_by_email(
        &self,
        email: &Email,
        patch: &ProfilePatch,
    ) -> Result<ProfileUpdateOutcome, ProfileStoreError> {
        let mut state = self.state.lock().unwrap();
        state.updates.push((email.clone(), patch.clone()));

        if let Some(message) = &state.failure {
            return Err(ProfileStoreError::Network(message.clone()));
        }

        let Value::Object(fields) = serde_json::to_value(patch)
            .map_err(|e| ProfileStoreError::InvalidResponse(e.to_string()))?
        else {
            return Err(ProfileStoreError::InvalidResponse(
                "patch is not an object".to_string(),
            ));
        };

        match state.rows.get_mut(email.as_str()) {
            Some(row) => {
                row.extend(fields);
                Ok(ProfileUpdateOutcome::Updated { rows: 1 })
            }
            None => Ok(ProfileUpdateOutcome::NoMatch),
        }
    }
}
