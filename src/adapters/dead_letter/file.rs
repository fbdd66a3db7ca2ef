//! File-based dead-letter log.
//!
//! Appends one JSON object per line. Writes are serialized through a lock so
//! concurrent webhooks never interleave partial lines.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::ports::{DeadLetterEntry, DeadLetterError, DeadLetterLog};

use super::tracing_log;

/// JSON-lines dead-letter file.
#[derive(Debug)]
pub struct FileDeadLetterLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileDeadLetterLog {
    /// Create a log appending to `path`. Parent directories are created on
    /// first write.
    ///
    /// # Example
    /// ```ignore
    /// let log = FileDeadLetterLog::new("/var/lib/subscription-bridge/dead-letter.jsonl");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DeadLetterLog for FileDeadLetterLog {
    async fn record(&self, entry: DeadLetterEntry) -> Result<(), DeadLetterError> {
        tracing_log::emit(&entry);

        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        Ok(())
    }
}
