//! Transfer handlers (idempotent submission, lookup)

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, CreateTransferRequest, error_codes, error_response};
use crate::ledger::{SubmitOutcome, SubmitRequest, fingerprint};

/// Header carrying the client-chosen idempotency token
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Submit a fund transfer
///
/// POST /api/v1/transfers
///
/// The request body is fingerprinted byte-for-byte before JSON decoding,
/// so a retry must resend the identical bytes to be recognized as a replay.
/// Replays return the originally stored status and body without touching
/// any balance.
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    params(
        ("Idempotency-Key" = String, Header, description = "Client-chosen token, at most 255 characters")
    ),
    responses(
        (status = 201, description = "Transfer completed (or replayed)", body = crate::ledger::TransferDocument, content_type = "application/json"),
        (status = 400, description = "Missing Idempotency-Key header or malformed body"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Concurrent request with the same key in flight"),
        (status = 422, description = "Validation failure, insufficient funds, or key reuse with a different payload")
    ),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // 1. Idempotency key is mandatory; reject before reading the body
    let key = match headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
    {
        Some(k) if !k.is_empty() => k.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    error_codes::MISSING_IDEMPOTENCY_KEY,
                    "Missing Idempotency-Key header",
                )),
            )
                .into_response();
        }
    };

    // 2. Fingerprint the raw bytes before any decode; whitespace and key
    //    order in the JSON matter to replay detection
    let request_hash = fingerprint(&body);

    // 3. Decode the body
    let req: CreateTransferRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Rejected malformed transfer body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    error_codes::INVALID_PARAMETER,
                    format!("Malformed JSON body: {e}"),
                )),
            )
                .into_response();
        }
    };

    let submit = SubmitRequest {
        idempotency_key: key,
        request_hash,
        from_account_id: req.from_account_id,
        to_account_id: req.to_account_id,
        amount: req.amount,
    };

    match state.executor.submit(submit).await {
        Ok(SubmitOutcome::Completed {
            transfer_id,
            record,
        }) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/api/v1/transfers/{transfer_id}"))],
            Json(ApiResponse::success(record)),
        )
            .into_response(),
        Ok(SubmitOutcome::Replayed { status, record }) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
            Json(ApiResponse::success(record)),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Fetch a transfer with its ledger entry pair
///
/// GET /api/v1/transfers/{transfer_id}
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{transfer_id}",
    params(
        ("transfer_id" = i64, Path, description = "Transfer ID")
    ),
    responses(
        (status = 200, description = "Transfer found", body = crate::ledger::TransferDocument, content_type = "application/json"),
        (status = 404, description = "Transfer not found")
    ),
    tag = "Transfers"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<i64>,
) -> Response {
    match state.executor.get_transfer(transfer_id).await {
        Ok(document) => Json(ApiResponse::success(document)).into_response(),
        Err(e) => error_response(&e),
    }
}
