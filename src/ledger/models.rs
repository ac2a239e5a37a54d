//! Core ledger records as they live in PostgreSQL.
//!
//! Field names and constraints (amount > 0, delta != 0, balance >= 0,
//! exactly two entries per transfer) are part of the durable on-disk
//! contract and mirror the migrations under `migrations/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Terminal status of a transfer row.
///
/// There is no pending state: a transfer row is only written once both of
/// its ledger entries exist in the same transaction. The engine never
/// persists a `failed` row, because failed attempts roll back wholesale;
/// the variant exists for data compatibility with operator tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TransferStatus {
    Completed,
    Failed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(TransferStatus::Completed),
            "failed" => Ok(TransferStatus::Failed),
            _ => Err(format!("Invalid transfer status: {}", s)),
        }
    }
}

/// Lifecycle of an idempotency key reservation.
///
/// `in_progress` is written when the key is reserved; it transitions at
/// most once to a terminal state inside the same transaction that commits
/// the transfer, and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum KeyStatus {
    InProgress,
    Completed,
    Failed,
}

impl KeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::InProgress => "in_progress",
            KeyStatus::Completed => "completed",
            KeyStatus::Failed => "failed",
        }
    }

    /// Terminal states carry a stored response and are replayed verbatim.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, KeyStatus::InProgress)
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KeyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(KeyStatus::InProgress),
            "completed" => Ok(KeyStatus::Completed),
            "failed" => Ok(KeyStatus::Failed),
            _ => Err(format!("Invalid key status: {}", s)),
        }
    }
}

/// Account row. Balance is in minor currency units and never negative;
/// it is mutated only by the ledger engine during a committed transfer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Account {
    pub id: i64,
    pub owner_name: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transfer row. Immutable once created; created exactly once per
/// successful execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Amount moved, in minor currency units. Always positive.
    pub amount: i64,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
}

/// One leg of a transfer. Exactly two rows exist per transfer: a negative
/// debit leg and a positive credit leg, summing to zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LedgerEntry {
    pub id: i64,
    pub transfer_id: i64,
    pub account_id: i64,
    /// Signed amount: negative on the debit leg, positive on the credit leg.
    pub delta: i64,
    pub created_at: DateTime<Utc>,
}

/// Write-once memo for one idempotency key.
#[derive(Debug, Clone, FromRow)]
pub struct IdempotencyRecord {
    pub key: String,
    pub request_hash: String,
    pub status: KeyStatus,
    pub transfer_id: Option<i64>,
    pub response_status: Option<i32>,
    pub response_body: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_status_roundtrip() {
        for status in [TransferStatus::Completed, TransferStatus::Failed] {
            let parsed: TransferStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_transfer_status_invalid() {
        assert!("pending".parse::<TransferStatus>().is_err());
        assert!("".parse::<TransferStatus>().is_err());
    }

    #[test]
    fn test_key_status_roundtrip() {
        for status in [
            KeyStatus::InProgress,
            KeyStatus::Completed,
            KeyStatus::Failed,
        ] {
            let parsed: KeyStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_key_status_terminal() {
        assert!(!KeyStatus::InProgress.is_terminal());
        assert!(KeyStatus::Completed.is_terminal());
        assert!(KeyStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TransferStatus::Completed.to_string(), "completed");
        assert_eq!(KeyStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_transfer_serializes_with_lowercase_status() {
        let transfer = Transfer {
            id: 7,
            from_account_id: 1,
            to_account_id: 2,
            amount: 500,
            status: TransferStatus::Completed,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&transfer).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["amount"], 500);
    }
}
