//! Ledger Engine
//!
//! Orchestrates one transfer submission end to end inside a single
//! REPEATABLE READ transaction: admit through the idempotency gate, lock
//! both accounts in ascending id order, validate the authoritative
//! balance, write the transfer row, both entry legs and the balance
//! updates, finalize the idempotency key, then commit with the
//! balanced-entries check registered.
//!
//! No partial effect is ever observable: any failure after admission rolls
//! back all writes together with the idempotency reservation, so the key
//! stays retryable.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use super::error::LedgerError;
use super::fingerprint::is_valid_fingerprint;
use super::idempotency::{Admission, IdempotencyGate};
use super::invariant::EntriesBalanced;
use super::locks::LockCoordinator;
use super::models::{LedgerEntry, Transfer};
use crate::store::{LedgerStore, LedgerTx, WaitMode, map_write_error};

/// Longest accepted idempotency key, in bytes.
pub const MAX_KEY_LEN: usize = 255;

/// HTTP status stored alongside the response document of a fresh transfer.
const STORED_RESPONSE_STATUS: u16 = 201;

/// One transfer submission, already fingerprinted by the caller.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub idempotency_key: String,
    /// Lowercase hex SHA-256 of the raw request body.
    pub request_hash: String,
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Amount in minor currency units. Must be positive.
    pub amount: i64,
}

/// Response document for a committed transfer: the transfer row plus both
/// of its ledger entries. Serialized once, stored with the idempotency
/// key, and replayed verbatim on retries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferDocument {
    pub transfer: Transfer,
    pub entries: Vec<LedgerEntry>,
}

/// How a submission concluded.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Executed in this call; the transaction committed.
    Completed {
        transfer_id: i64,
        record: serde_json::Value,
    },
    /// A byte-identical request already completed; this is its stored
    /// response, returned without touching the ledger.
    Replayed {
        status: u16,
        record: serde_json::Value,
    },
}

/// Drives transfer submissions against the store.
///
/// Holds no mutable state of its own; every request is an independent
/// transaction, which keeps the service safe to replicate horizontally.
pub struct TransferExecutor {
    store: LedgerStore,
    locks: LockCoordinator,
}

impl TransferExecutor {
    pub fn new(store: LedgerStore, wait_mode: WaitMode) -> Self {
        Self {
            store,
            locks: LockCoordinator::new(wait_mode),
        }
    }

    /// Submit a transfer.
    ///
    /// Validation runs before any storage is touched. After admission the
    /// whole flow lives in one transaction; the balanced-entries check is
    /// registered as a deferred pre-commit check and vetoes COMMIT on any
    /// double-entry violation.
    pub async fn submit(&self, req: SubmitRequest) -> Result<SubmitOutcome, LedgerError> {
        Self::validate(&req)?;

        let mut tx = self.store.begin().await?;

        match IdempotencyGate::admit(&mut tx, &req.idempotency_key, &req.request_hash).await? {
            Admission::Replay { status, body } => {
                tx.rollback().await?;
                info!(key = %req.idempotency_key, "transfer replayed from stored response");
                return Ok(SubmitOutcome::Replayed {
                    status,
                    record: body,
                });
            }
            Admission::Fresh => {}
        }

        let pair = self
            .locks
            .lock_pair(&mut tx, req.from_account_id, req.to_account_id)
            .await?;

        // Authoritative post-lock balance; values observed before locking
        // never participate in this decision.
        if pair.from.balance < req.amount {
            tx.rollback().await?;
            debug!(
                account_id = req.from_account_id,
                balance = pair.from.balance,
                amount = req.amount,
                "insufficient funds"
            );
            return Err(LedgerError::InsufficientFunds {
                account_id: req.from_account_id,
            });
        }

        let transfer = Self::insert_transfer(&mut tx, &req).await?;
        let entries = Self::insert_entries(&mut tx, transfer.id, &req).await?;
        Self::apply_balances(&mut tx, &req).await?;

        let document = TransferDocument { transfer, entries };
        let record =
            serde_json::to_value(&document).map_err(|e| LedgerError::Internal(e.to_string()))?;
        let transfer_id = document.transfer.id;

        IdempotencyGate::finalize(
            &mut tx,
            &req.idempotency_key,
            transfer_id,
            STORED_RESPONSE_STATUS,
            &record,
        )
        .await?;

        tx.register_check(Box::new(EntriesBalanced { transfer_id }));
        tx.commit().await?;

        info!(
            transfer_id,
            from = req.from_account_id,
            to = req.to_account_id,
            amount = req.amount,
            "transfer committed"
        );

        Ok(SubmitOutcome::Completed {
            transfer_id,
            record,
        })
    }

    /// Fetch a transfer together with its two ledger entries.
    pub async fn get_transfer(&self, id: i64) -> Result<TransferDocument, LedgerError> {
        let transfer = sqlx::query_as::<_, Transfer>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, status, created_at
            FROM transfers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.store.pool())
        .await?
        .ok_or(LedgerError::TransferNotFound(id))?;

        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, transfer_id, account_id, delta, created_at
            FROM ledger_entries
            WHERE transfer_id = $1
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(self.store.pool())
        .await?;

        Ok(TransferDocument { transfer, entries })
    }

    /// Preconditions checked before any storage roundtrip.
    fn validate(req: &SubmitRequest) -> Result<(), LedgerError> {
        if req.idempotency_key.is_empty() {
            return Err(LedgerError::Validation(
                "Idempotency key must not be empty".to_string(),
            ));
        }
        if req.idempotency_key.len() > MAX_KEY_LEN {
            return Err(LedgerError::Validation(format!(
                "Idempotency key exceeds {} bytes",
                MAX_KEY_LEN
            )));
        }
        if !is_valid_fingerprint(&req.request_hash) {
            return Err(LedgerError::Validation(
                "Request hash must be 64 lowercase hex characters".to_string(),
            ));
        }
        if req.amount <= 0 {
            return Err(LedgerError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }
        if req.from_account_id == req.to_account_id {
            return Err(LedgerError::Validation(
                "Source and target account cannot be the same".to_string(),
            ));
        }
        Ok(())
    }

    async fn insert_transfer(
        tx: &mut LedgerTx,
        req: &SubmitRequest,
    ) -> Result<Transfer, LedgerError> {
        let transfer = sqlx::query_as::<_, Transfer>(
            r#"
            INSERT INTO transfers (from_account_id, to_account_id, amount, status)
            VALUES ($1, $2, $3, 'completed')
            RETURNING id, from_account_id, to_account_id, amount, status, created_at
            "#,
        )
        .bind(req.from_account_id)
        .bind(req.to_account_id)
        .bind(req.amount)
        .fetch_one(tx.conn())
        .await
        .map_err(map_write_error)?;

        Ok(transfer)
    }

    /// Write both legs in one statement: debit on the source, credit on
    /// the target, summing to zero.
    async fn insert_entries(
        tx: &mut LedgerTx,
        transfer_id: i64,
        req: &SubmitRequest,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (transfer_id, account_id, delta)
            VALUES ($1, $2, $3), ($1, $4, $5)
            RETURNING id, transfer_id, account_id, delta, created_at
            "#,
        )
        .bind(transfer_id)
        .bind(req.from_account_id)
        .bind(-req.amount)
        .bind(req.to_account_id)
        .bind(req.amount)
        .fetch_all(tx.conn())
        .await
        .map_err(map_write_error)?;

        Ok(entries)
    }

    async fn apply_balances(tx: &mut LedgerTx, req: &SubmitRequest) -> Result<(), LedgerError> {
        let debit =
            sqlx::query("UPDATE accounts SET balance = balance - $1, updated_at = now() WHERE id = $2")
                .bind(req.amount)
                .bind(req.from_account_id)
                .execute(tx.conn())
                .await
                .map_err(map_write_error)?;

        let credit =
            sqlx::query("UPDATE accounts SET balance = balance + $1, updated_at = now() WHERE id = $2")
                .bind(req.amount)
                .bind(req.to_account_id)
                .execute(tx.conn())
                .await
                .map_err(map_write_error)?;

        // Both rows are locked by this transaction; anything but one row
        // per update means the store state is inconsistent.
        if debit.rows_affected() != 1 || credit.rows_affected() != 1 {
            return Err(LedgerError::Internal(
                "balance update touched an unexpected row count".to_string(),
            ));
        }

        Ok(())
    }
}
