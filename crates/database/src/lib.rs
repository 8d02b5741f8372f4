//! # Database Crate
//!
//! This crate acts as the application-specific interface to the relational
//! store that holds the `records` table.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** Encapsulates all SQL. The rest of the application sees
//!   `Record` values and `DbError`, never rows or statements.
//! - **One unit of work per operation:** Every mutating method opens its own
//!   transaction and either commits it or lets it roll back on drop, so a
//!   failed call leaves the table as it was.
//! - **Asynchronous & Pooled:** All operations are async and share a
//!   `SqlitePool`.
//!
//! ## Public API
//!
//! - `connect`: Builds the connection pool from `DatabaseSettings`.
//! - `run_migrations`: Applies the embedded schema migrations.
//! - `RecordRepository`: Data access methods for the `records` table.
//! - `DbError`: The error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::RecordRepository;
