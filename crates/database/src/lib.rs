//! # Papertrade Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database. It owns every table the simulator persists: users,
//! holdings, the append-only trade log, and server-side sessions.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** encapsulates all database-specific logic and SQL, exposing
//!   a clean API to the rest of the application.
//! - **Transactional ledger:** `execute_buy` and `execute_sell` run as a
//!   single SQL transaction so cash, holding, and trade-log mutations commit
//!   together or not at all.
//! - **Asynchronous & Pooled:** all operations are asynchronous and share a
//!   `PgPool` for concurrent access.
//!
//! ## Public API
//!
//! - `connect`: the async function to establish the database connection pool.
//! - `run_migrations`: applies database migrations, ensuring the schema is up-to-date.
//! - `DbRepository`: holds the connection pool and provides all high-level
//!   data access methods (e.g., `execute_buy`, `trades_for_user`).
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
