//! # scenariobot-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `DictionaryRepository` and `HistoryRepository` ports
//!   defined in `scenariobot-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `scenariobot-app` (for port traits) and `scenariobot-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod dictionary_repo;
pub mod error;
pub mod history_repo;
pub mod pool;

pub use dictionary_repo::SqliteDictionary;
pub use error::StorageError;
pub use history_repo::SqliteHistoryRepository;
pub use pool::{Config, Database};
