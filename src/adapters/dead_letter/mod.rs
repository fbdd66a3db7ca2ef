//! Dead-letter log adapters.
//!
//! - `TracingDeadLetterLog` - emits each entry as a structured `error!` event
//! - `FileDeadLetterLog` - appends JSON lines to a file, and also traces
//! - `InMemoryDeadLetterLog` - collects entries for assertions

mod file;
mod in_memory;
mod tracing_log;

pub use file::FileDeadLetterLog;
pub use in_memory::InMemoryDeadLetterLog;
pub use tracing_log::TracingDeadLetterLog;
