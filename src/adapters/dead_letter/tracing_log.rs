//! Dead-letter sink that writes to the tracing output.
//!
//! Entries are emitted as one structured `error!` event. The profile email is
//! reduced to its domain so log pipelines never hold the full address; the
//! file sink keeps it for repair.

use async_trait::async_trait;

use crate::ports::{DeadLetterEntry, DeadLetterError, DeadLetterLog};

/// Dead-letter log that only writes to the tracing output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDeadLetterLog;

impl TracingDeadLetterLog {
    pub fn new() -> Self {
        Self
    }
}

pub(super) fn emit(entry: &DeadLetterEntry) {
    let patch = entry
        .patch
        .as_ref()
        .and_then(|p| serde_json::to_string(p).ok());
    let email = entry.email.as_deref().map(redacted_email);

    tracing::error!(
        dead_letter_id = %entry.id,
        event_id = %entry.event_id,
        event_type = %entry.event_type,
        stage = entry.stage.as_str(),
        email = email.as_deref(),
        patch = patch.as_deref(),
        reason = %entry.reason,
        "Webhook update dead-lettered"
    );
}

/// `a@x.com` becomes `***@x.com`.
fn redacted_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((_, domain)) => format!("***@{domain}"),
        None => "***".to_string(),
    }
}

#[async_trait]
impl DeadLetterLog for TracingDeadLetterLog {
    async fn record(&self, entry: DeadLetterEntry) -> Result<(), DeadLetterError> {
        emit(&entry);
        Ok(())
    }
}
