use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{DeadLetterEntry, DeadLetterError, DeadLetterLog};

/// Dead-letter log collecting entries in memory.
#[derive(Clone, Default)]
pub struct InMemoryDeadLetterLog {
    entries: Arc<Mutex<Vec<DeadLetterEntry>>>,
}

impl InMemoryDeadLetterLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<DeadLetterEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl DeadLetterLog for InMemoryDeadLetterLog {
    async fn record(&self, entry: DeadLetterEntry) -> Result<(), DeadLetterError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}
