//! Integration Tests for the Ledger Engine
//!
//! These tests run the full submission path against a real PostgreSQL
//! database (migrations applied, `DATABASE_URL` pointing at it) and cover
//! the double-entry, idempotency and concurrency contracts end to end.

use std::sync::Arc;

use crate::accounts::repository::tests::create_test_pool;
use crate::ledger::engine::{SubmitOutcome, SubmitRequest, TransferExecutor};
use crate::ledger::error::LedgerError;
use crate::ledger::fingerprint::fingerprint;
use crate::ledger::models::TransferStatus;
use crate::store::{LedgerStore, WaitMode};

/// Store plus executor wired the way the service wires them.
struct TestHarness {
    store: LedgerStore,
    executor: Arc<TransferExecutor>,
}

impl TestHarness {
    async fn new() -> Self {
        Self::with_wait_mode(WaitMode::Block).await
    }

    async fn with_wait_mode(wait_mode: WaitMode) -> Self {
        let pool = create_test_pool().await;
        let store = LedgerStore::new(pool);
        let executor = Arc::new(TransferExecutor::new(store.clone(), wait_mode));
        Self { store, executor }
    }

    /// Create an account with the given opening balance.
    async fn account(&self, balance: i64) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO accounts (owner_name, balance) VALUES ($1, $2) RETURNING id",
        )
        .bind(format!("it-{}", unique_suffix()))
        .bind(balance)
        .fetch_one(self.store.pool())
        .await
        .expect("create fixture account")
    }

    async fn balance(&self, id: i64) -> i64 {
        sqlx::query_scalar("SELECT balance FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_one(self.store.pool())
            .await
            .expect("read balance")
    }

    async fn transfer_count(&self, from: i64, to: i64) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM transfers WHERE from_account_id = $1 AND to_account_id = $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(self.store.pool())
        .await
        .expect("count transfers")
    }

    async fn key_exists(&self, key: &str) -> bool {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM idempotency_keys WHERE key = $1")
            .bind(key)
            .fetch_one(self.store.pool())
            .await
            .expect("count keys");
        count > 0
    }
}

/// Build a submission the way the API layer does: fingerprint the raw
/// body bytes, then decode the fields.
fn submit_request(key: &str, from: i64, to: i64, amount: i64) -> SubmitRequest {
    let body = format!(
        r#"{{"from_account_id":{},"to_account_id":{},"amount":{}}}"#,
        from, to, amount
    );
    SubmitRequest {
        idempotency_key: key.to_string(),
        request_hash: fingerprint(body.as_bytes()),
        from_account_id: from,
        to_account_id: to,
        amount,
    }
}

fn unique_suffix() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

fn unique_key(tag: &str) -> String {
    format!("{}-{}", tag, unique_suffix())
}

fn expect_completed(outcome: SubmitOutcome) -> (i64, serde_json::Value) {
    match outcome {
        SubmitOutcome::Completed {
            transfer_id,
            record,
        } => (transfer_id, record),
        other => panic!("expected fresh completion, got {:?}", other),
    }
}

// ========================================================================
// Happy Path
// ========================================================================

/// A=1000, B=0; transfer 300 moves balances and writes balanced entries.
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_transfer_moves_funds_and_balances_entries() {
    let harness = TestHarness::new().await;
    let a = harness.account(1000).await;
    let b = harness.account(0).await;
    let key = unique_key("happy");

    let outcome = harness
        .executor
        .submit(submit_request(&key, a, b, 300))
        .await
        .unwrap();
    let (transfer_id, record) = expect_completed(outcome);

    assert_eq!(harness.balance(a).await, 700);
    assert_eq!(harness.balance(b).await, 300);

    // Response document carries the transfer row and both legs.
    assert_eq!(record["transfer"]["status"], "completed");
    assert_eq!(record["transfer"]["amount"], 300);
    let entries = record["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);

    // Durable rows agree with the document.
    let document = harness.executor.get_transfer(transfer_id).await.unwrap();
    assert_eq!(document.transfer.status, TransferStatus::Completed);
    assert_eq!(document.entries.len(), 2);
    let deltas: Vec<i64> = document.entries.iter().map(|e| e.delta).collect();
    assert!(deltas.contains(&-300));
    assert!(deltas.contains(&300));
    assert_eq!(deltas.iter().sum::<i64>(), 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_get_unknown_transfer_not_found() {
    let harness = TestHarness::new().await;
    let result = harness.executor.get_transfer(-1).await;
    assert!(matches!(result, Err(LedgerError::TransferNotFound(-1))));
}

// ========================================================================
// Idempotency
// ========================================================================

/// Replaying an identical (key, payload) yields a byte-identical cached
/// response and exactly one transfer row.
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_replay_returns_identical_response_without_new_transfer() {
    let harness = TestHarness::new().await;
    let a = harness.account(1000).await;
    let b = harness.account(0).await;
    let key = unique_key("replay");

    let (_, first_record) = expect_completed(
        harness
            .executor
            .submit(submit_request(&key, a, b, 300))
            .await
            .unwrap(),
    );

    // Replay twice; each returns the stored response verbatim.
    for _ in 0..2 {
        let outcome = harness
            .executor
            .submit(submit_request(&key, a, b, 300))
            .await
            .unwrap();
        match outcome {
            SubmitOutcome::Replayed { status, record } => {
                assert_eq!(status, 201);
                assert_eq!(
                    serde_json::to_string(&record).unwrap(),
                    serde_json::to_string(&first_record).unwrap(),
                );
            }
            other => panic!("expected replay, got {:?}", other),
        }
    }

    assert_eq!(harness.transfer_count(a, b).await, 1);
    assert_eq!(harness.balance(a).await, 700);
    assert_eq!(harness.balance(b).await, 300);
}

/// The same key with a different payload is permanently a mismatch and
/// never creates a second transfer.
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_key_reuse_with_different_payload_is_mismatch() {
    let harness = TestHarness::new().await;
    let a = harness.account(1000).await;
    let b = harness.account(0).await;
    let key = unique_key("mismatch");

    expect_completed(
        harness
            .executor
            .submit(submit_request(&key, a, b, 300))
            .await
            .unwrap(),
    );

    let result = harness
        .executor
        .submit(submit_request(&key, a, b, 500))
        .await;
    assert!(matches!(result, Err(LedgerError::Mismatch)));

    // No state change from the rejected reuse.
    assert_eq!(harness.transfer_count(a, b).await, 1);
    assert_eq!(harness.balance(a).await, 700);
    assert_eq!(harness.balance(b).await, 300);
}

// ========================================================================
// Failure Paths
// ========================================================================

/// Overdrawing fails without mutating anything, and the rolled-back
/// reservation leaves the key retryable after a funding change.
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_insufficient_funds_leaves_no_trace() {
    let harness = TestHarness::new().await;
    let a = harness.account(100).await;
    let b = harness.account(0).await;
    let key = unique_key("broke");

    let result = harness
        .executor
        .submit(submit_request(&key, a, b, 500))
        .await;
    match result {
        Err(LedgerError::InsufficientFunds { account_id }) => assert_eq!(account_id, a),
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }

    assert_eq!(harness.balance(a).await, 100);
    assert_eq!(harness.balance(b).await, 0);
    assert_eq!(harness.transfer_count(a, b).await, 0);
    assert!(!harness.key_exists(&key).await, "reservation must roll back");

    // Fund the account and retry the very same request.
    sqlx::query("UPDATE accounts SET balance = balance + 1000 WHERE id = $1")
        .bind(a)
        .execute(harness.store.pool())
        .await
        .unwrap();

    expect_completed(
        harness
            .executor
            .submit(submit_request(&key, a, b, 500))
            .await
            .unwrap(),
    );
    assert_eq!(harness.balance(a).await, 600);
    assert_eq!(harness.balance(b).await, 500);
}

/// Unknown accounts abort the whole transaction, reservation included.
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_unknown_account_aborts_and_frees_key() {
    let harness = TestHarness::new().await;
    let a = harness.account(1000).await;
    let key = unique_key("ghost");

    let result = harness
        .executor
        .submit(submit_request(&key, a, -999, 100))
        .await;
    assert!(matches!(result, Err(LedgerError::AccountNotFound(-999))));
    assert!(!harness.key_exists(&key).await);
    assert_eq!(harness.balance(a).await, 1000);
}

/// Self-transfers are rejected in validation, before any storage access.
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_self_transfer_rejected_before_any_lock() {
    let harness = TestHarness::new().await;
    let a = harness.account(1000).await;
    let key = unique_key("selfie");

    let result = harness.executor.submit(submit_request(&key, a, a, 100)).await;
    assert!(matches!(result, Err(LedgerError::Validation(_))));

    // Nothing was written, not even the reservation.
    assert!(!harness.key_exists(&key).await);
    assert_eq!(harness.balance(a).await, 1000);
}

// ========================================================================
// Concurrency
// ========================================================================

/// Two concurrent submissions under one key produce exactly one transfer;
/// the loser sees Conflict (overlapped) or Replay (serialized after).
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_concurrent_identical_requests_single_transfer() {
    let harness = TestHarness::new().await;
    let a = harness.account(1000).await;
    let b = harness.account(0).await;
    let key = unique_key("race");

    let exec1 = harness.executor.clone();
    let exec2 = harness.executor.clone();
    let req1 = submit_request(&key, a, b, 300);
    let req2 = submit_request(&key, a, b, 300);

    let (r1, r2) = tokio::join!(
        tokio::spawn(async move { exec1.submit(req1).await }),
        tokio::spawn(async move { exec2.submit(req2).await }),
    );

    let mut completed = 0;
    let mut deflected = 0;
    for result in [r1.unwrap(), r2.unwrap()] {
        match result {
            Ok(SubmitOutcome::Completed { .. }) => completed += 1,
            Ok(SubmitOutcome::Replayed { .. }) | Err(LedgerError::Conflict) => deflected += 1,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    assert_eq!(completed, 1, "exactly one request may execute");
    assert_eq!(deflected, 1);
    assert_eq!(harness.transfer_count(a, b).await, 1);
    assert_eq!(harness.balance(a).await, 700);
    assert_eq!(harness.balance(b).await, 300);
}

/// Opposing transfers on the same pair never deadlock: every attempt
/// terminates as completed or a retryable conflict, and money is
/// conserved across the pair.
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_opposing_transfers_never_deadlock() {
    let harness = TestHarness::new().await;
    let a = harness.account(1000).await;
    let b = harness.account(1000).await;

    let mut completed_ab = 0i64;
    let mut completed_ba = 0i64;
    let mut conflicts = 0;
    let rounds = 10;

    for round in 0..rounds {
        let exec1 = harness.executor.clone();
        let exec2 = harness.executor.clone();
        let req_ab = submit_request(&unique_key(&format!("ab-{}", round)), a, b, 10);
        let req_ba = submit_request(&unique_key(&format!("ba-{}", round)), b, a, 10);

        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { exec1.submit(req_ab).await }),
            tokio::spawn(async move { exec2.submit(req_ba).await }),
        );

        for (result, forward) in [(r1.unwrap(), true), (r2.unwrap(), false)] {
            match result {
                Ok(SubmitOutcome::Completed { .. }) => {
                    if forward {
                        completed_ab += 1;
                    } else {
                        completed_ba += 1;
                    }
                }
                Err(LedgerError::Conflict) => conflicts += 1,
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
    }

    // completed + conflicted = attempted
    assert_eq!(completed_ab + completed_ba + conflicts, rounds * 2);

    // Conservation: the pair's total never changes, and each balance
    // reflects exactly the committed net flow.
    let net = (completed_ba - completed_ab) * 10;
    assert_eq!(harness.balance(a).await, 1000 + net);
    assert_eq!(harness.balance(b).await, 1000 - net);
}

/// Fail-fast mode turns lock waits into immediate retryable conflicts.
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_nowait_mode_fails_fast_under_contention() {
    let harness = TestHarness::with_wait_mode(WaitMode::Nowait).await;
    let a = harness.account(1000).await;
    let b = harness.account(1000).await;

    // Hold a's row lock from a foreign transaction.
    let mut blocker = harness.store.begin().await.unwrap();
    sqlx::query("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
        .bind(a)
        .execute(blocker.conn())
        .await
        .unwrap();

    let result = harness
        .executor
        .submit(submit_request(&unique_key("nowait"), a, b, 10))
        .await;
    assert!(matches!(result, Err(LedgerError::Conflict)));

    blocker.rollback().await.unwrap();
    assert_eq!(harness.balance(a).await, 1000);
    assert_eq!(harness.balance(b).await, 1000);
}
