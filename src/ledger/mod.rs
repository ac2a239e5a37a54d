//! Double-Entry Transfer Ledger
//!
//! Moves funds between accounts with exactly-once semantics, backed by
//! PostgreSQL. Every submission runs as one REPEATABLE READ transaction.
//!
//! # Architecture
//!
//! ```text
//! submit ─▶ validate ─▶ idempotency gate ─▶ lock pair ─▶ balance check
//!                                                            │
//!        COMMIT ◀─ balanced-entries check ◀─ finalize key ◀─ write rows
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Double-entry**: every transfer writes exactly two entry rows whose
//!    deltas sum to zero, verified by a deferred pre-commit check
//! 2. **No overdrafts**: the debit decision uses the post-lock balance,
//!    never a value read before locking
//! 3. **Deterministic lock order**: account rows lock in ascending id
//!    order regardless of transfer direction, so deadlock is impossible
//! 4. **All-or-nothing**: ledger rows, balance updates and the idempotency
//!    memo commit together or roll back together

pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod idempotency;
pub mod invariant;
pub mod locks;
pub mod models;
pub mod sweeper;

#[cfg(test)]
mod integration_tests;

// Re-exports for convenience
pub use engine::{SubmitOutcome, SubmitRequest, TransferDocument, TransferExecutor};
pub use error::LedgerError;
pub use fingerprint::fingerprint;
pub use idempotency::{Admission, IdempotencyGate};
pub use locks::{LockCoordinator, ordered_pair};
pub use models::{Account, KeyStatus, LedgerEntry, Transfer, TransferStatus};
pub use sweeper::{RetentionSweeper, SweeperConfig};
