//! Persistence backends for portfolios and accounts.
//!
//! - [`MemoryStore`]: process-local storage with failure injection, used by
//!   tests and ephemeral sessions
//! - [`SqliteStore`]: durable storage on SQLite (`sqlite` feature, on by default)

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
