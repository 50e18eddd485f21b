//! Pennybook REST server: Axum surface over the ledger core and SQLite
//! storage.

pub mod api;
pub mod config;
pub mod error;
pub mod main_lib;

pub use main_lib::{build_state, init_tracing, AppState};
