//! Ledger Error Types
//!
//! One taxonomy for every failure a transfer submission can surface.
//! Retryability is part of the contract: only `Conflict` is safe to retry
//! with the same idempotency key.

use thiserror::Error;

use crate::store::StoreError;

/// Ledger error taxonomy
///
/// Error codes are stable strings for API responses.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    // === Validation Errors (rejected pre-lock, no side effects) ===
    #[error("Validation failed: {0}")]
    Validation(String),

    // === Resource Errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    #[error("Transfer not found: {0}")]
    TransferNotFound(i64),

    // === Business Rejection ===
    #[error("Insufficient funds in account {account_id}")]
    InsufficientFunds { account_id: i64 },

    // === Transient Errors ===
    #[error("Concurrent request in flight; retry with the same idempotency key")]
    Conflict,

    // === Client Bugs ===
    #[error("Idempotency key reused with a different request payload")]
    Mismatch,

    // === System Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "VALIDATION",
            LedgerError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            LedgerError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            LedgerError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            LedgerError::Conflict => "CONFLICT",
            LedgerError::Mismatch => "IDEMPOTENCY_MISMATCH",
            LedgerError::Internal(_) => "INTERNAL",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::Validation(_)
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::Mismatch => 422,
            LedgerError::AccountNotFound(_) | LedgerError::TransferNotFound(_) => 404,
            LedgerError::Conflict => 409,
            LedgerError::Internal(_) => 500,
        }
    }

    /// Whether the client may retry the same request unchanged.
    ///
    /// Only transient contention qualifies; everything else needs a
    /// corrected request or a funding change first.
    pub fn retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict)
    }

    /// Message safe to show to clients. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            LedgerError::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            // Callers resolve missing accounts to AccountNotFound before
            // this point; a NotFound here means a row vanished mid-flight.
            StoreError::NotFound => LedgerError::Internal("unexpected missing row".to_string()),
            StoreError::DuplicateKey | StoreError::LockUnavailable | StoreError::Serialization => {
                LedgerError::Conflict
            }
            StoreError::CheckViolation(msg) => LedgerError::Internal(msg),
            StoreError::Database(err) => LedgerError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for LedgerError {
    fn from(e: anyhow::Error) -> Self {
        LedgerError::Internal(e.to_string())
    }
}
