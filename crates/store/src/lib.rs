//! Memory store client implementations for memento.
//!
//! Local stores (in-memory, SQLite) model the external service's async
//! consolidation with a visibility delay: appended events only become
//! retrievable records once the configured lag has elapsed. The HTTP
//! store talks to a remote memory service that does the real extraction.

pub mod in_memory;
pub mod noop;
pub mod setup;

pub mod http;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use http::HttpStore;
pub use in_memory::InMemoryStore;
pub use noop::NoopStore;
pub use setup::{ensure_resource, teardown};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
