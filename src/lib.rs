//! ledgerd - Double-Entry Fund Transfer Ledger
//!
//! A PostgreSQL-backed transfer service that moves funds between accounts
//! under strict invariants: every transfer writes a balanced ledger entry
//! pair, balances never go negative, and retried submissions replay the
//! original response instead of moving funds twice.
//!
//! # Modules
//!
//! - [`ledger`] - Transfer engine (idempotency, lock ordering, invariants)
//! - [`accounts`] - Account repository (creation, lookup, entry history)
//! - [`store`] - Transaction glue over sqlx (isolation, pre-commit checks)
//! - [`api`] - HTTP surface (axum + OpenAPI)
//! - [`db`] - Pool construction and schema migrations
//! - [`config`] - YAML configuration per environment
//! - [`logging`] - tracing-subscriber setup with file rotation

pub mod accounts;
pub mod api;
pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod store;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use ledger::{
    LedgerError, RetentionSweeper, SubmitOutcome, SubmitRequest, TransferDocument,
    TransferExecutor,
};
pub use store::{LedgerStore, WaitMode};
