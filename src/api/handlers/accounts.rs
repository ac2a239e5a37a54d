//! Account handlers (creation, lookup, ledger entry listing)

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, CreateAccountRequest, EntriesQuery, error_response};
use crate::accounts::AccountRepository;
use crate::ledger::LedgerError;

/// Create account endpoint
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = crate::ledger::Account, content_type = "application/json"),
        (status = 422, description = "Invalid parameters")
    ),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAccountRequest>,
) -> Response {
    if req.owner_name.trim().is_empty() {
        return error_response(&LedgerError::Validation(
            "Owner name cannot be empty".to_string(),
        ));
    }
    if req.balance < 0 {
        return error_response(&LedgerError::Validation(
            "Opening balance cannot be negative".to_string(),
        ));
    }

    match AccountRepository::create(state.db.pool(), req.owner_name.trim(), req.balance).await {
        Ok(account) => {
            tracing::info!(
                account_id = account.id,
                balance = account.balance,
                "Account created"
            );
            (StatusCode::CREATED, Json(ApiResponse::success(account))).into_response()
        }
        Err(e) => error_response(&LedgerError::Internal(format!(
            "Account creation failed: {e}"
        ))),
    }
}

/// Get account endpoint
///
/// GET /api/v1/accounts/{account_id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    params(
        ("account_id" = i64, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account found", body = crate::ledger::Account, content_type = "application/json"),
        (status = 404, description = "Account not found")
    ),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<i64>,
) -> Response {
    match AccountRepository::get_by_id(state.db.pool(), account_id).await {
        Ok(Some(account)) => Json(ApiResponse::success(account)).into_response(),
        Ok(None) => error_response(&LedgerError::AccountNotFound(account_id)),
        Err(e) => error_response(&LedgerError::Internal(format!("Account lookup failed: {e}"))),
    }
}

/// List an account's ledger entries, newest first
///
/// GET /api/v1/accounts/{account_id}/entries?limit=50
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/entries",
    params(
        ("account_id" = i64, Path, description = "Account ID"),
        ("limit" = Option<i64>, Query, description = "Max entries to return (default 50, capped at 500)")
    ),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<crate::ledger::LedgerEntry>, content_type = "application/json"),
        (status = 404, description = "Account not found")
    ),
    tag = "Accounts"
)]
pub async fn get_account_entries(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<i64>,
    Query(query): Query<EntriesQuery>,
) -> Response {
    // 404 for unknown accounts rather than an empty list
    match AccountRepository::get_by_id(state.db.pool(), account_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(&LedgerError::AccountNotFound(account_id)),
        Err(e) => {
            return error_response(&LedgerError::Internal(format!(
                "Account lookup failed: {e}"
            )));
        }
    }

    match AccountRepository::entries(state.db.pool(), account_id, query.effective_limit()).await {
        Ok(entries) => Json(ApiResponse::success(entries)).into_response(),
        Err(e) => error_response(&LedgerError::Internal(format!("Entry listing failed: {e}"))),
    }
}

