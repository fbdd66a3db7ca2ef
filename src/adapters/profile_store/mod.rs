//! Profile store adapters.
//!
//! - `PostgrestProfileStore` - PATCH against a PostgREST (Supabase) table
//! - `InMemoryProfileStore` - Row map for tests and local runs

mod in_memory;
mod postgrest;

pub use in_memory::InMemoryProfileStore;
pub use postgrest::PostgrestProfileStore;
