//! # pageforge-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the [`AutomationRepository`] and [`ExecutionLog`] port traits
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `pageforge-app` (for port traits) and `pageforge-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.
//!
//! [`AutomationRepository`]: pageforge_app::ports::AutomationRepository
//! [`ExecutionLog`]: pageforge_app::ports::ExecutionLog

pub mod automation_repo;
pub mod error;
pub mod execution_log;
pub mod pool;

pub use automation_repo::SqliteAutomationRepository;
pub use error::StorageError;
pub use execution_log::SqliteExecutionLog;
pub use pool::{Config, Database};
