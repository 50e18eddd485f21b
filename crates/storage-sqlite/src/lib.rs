//! SQLite storage implementation for Pennybook.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `pennybook-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations (including the seeded system categories)
//! - Repository implementations for all domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. Everything else is database-agnostic and works with traits.
//! Balance-affecting writes run on a single writer actor
//! ([`db::write_actor`]), which is what makes transaction rows, balance
//! updates, and idempotency keys commit atomically.

pub mod db;
pub mod errors;
pub mod schema;

mod utils;

// Repository implementations
pub mod categories;
pub mod fx;
pub mod settings;
pub mod transactions;
pub mod wallets;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from pennybook-core for convenience
pub use pennybook_core::errors::{DatabaseError, Error, Result};
