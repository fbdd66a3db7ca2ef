//! Dead-letter log configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where verified-but-unapplied webhook updates are written.
///
/// Without a path, entries go to the tracing log only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeadLetterConfig {
    /// JSON-lines file to append entries to
    pub path: Option<PathBuf>,
}
