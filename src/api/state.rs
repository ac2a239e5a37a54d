//! Shared HTTP application state

use std::sync::Arc;

use crate::db::Database;
use crate::ledger::TransferExecutor;

/// Application state shared across all HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL database handle (pool + migrations + health)
    pub db: Arc<Database>,
    /// Transfer executor (locking, idempotency, invariant checks)
    pub executor: Arc<TransferExecutor>,
}

impl AppState {
    pub fn new(db: Arc<Database>, executor: Arc<TransferExecutor>) -> Self {
        Self { db, executor }
    }
}
