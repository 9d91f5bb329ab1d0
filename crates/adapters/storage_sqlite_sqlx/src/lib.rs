//! # loopctl-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `SettingsStore` and `OfflineEventStore` from `loopctl-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `loopctl-app` (for port traits) and `loopctl-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod offline_event_repo;
pub mod pool;
pub mod settings_store;

pub use offline_event_repo::SqliteOfflineEventStore;
pub use pool::{Config, Database};
pub use settings_store::SqliteSettingsStore;
