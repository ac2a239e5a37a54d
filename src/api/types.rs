//! API request/response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `error_codes`: Standard error code constants
//! - Request DTOs for the transfer and account endpoints

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::LedgerError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Transfer submission body
///
/// The `Idempotency-Key` header carries the client token; the body only
/// names the accounts and the amount in minor units.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTransferRequest {
    /// Account debited
    #[schema(example = 1001)]
    pub from_account_id: i64,
    /// Account credited
    #[schema(example = 1002)]
    pub to_account_id: i64,
    /// Amount in minor units, must be positive
    #[schema(example = 2500)]
    pub amount: i64,
}

/// Account creation body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    /// Display name of the account owner
    #[schema(example = "alice")]
    pub owner_name: String,
    /// Opening balance in minor units (defaults to 0)
    #[serde(default)]
    #[schema(example = 10000)]
    pub balance: i64,
}

/// Query parameters for the account entries listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct EntriesQuery {
    /// Max entries to return (default 50, capped at 500)
    pub limit: Option<i64>,
}

impl EntriesQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 500;

    /// Effective limit after defaulting and clamping
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const MISSING_IDEMPOTENCY_KEY: i32 = 1002;
    pub const IDEMPOTENCY_MISMATCH: i32 = 1003;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4041;
    pub const TRANSFER_NOT_FOUND: i32 = 4042;
    pub const KEY_CONFLICT: i32 = 4091;
    pub const INSUFFICIENT_FUNDS: i32 = 4221;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
}

/// Map a ledger error to its HTTP status and API error code
pub fn map_error(err: &LedgerError) -> (StatusCode, i32) {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = match err {
        LedgerError::Validation(_) => error_codes::INVALID_PARAMETER,
        LedgerError::AccountNotFound(_) => error_codes::ACCOUNT_NOT_FOUND,
        LedgerError::TransferNotFound(_) => error_codes::TRANSFER_NOT_FOUND,
        LedgerError::InsufficientFunds { .. } => error_codes::INSUFFICIENT_FUNDS,
        LedgerError::Conflict => error_codes::KEY_CONFLICT,
        LedgerError::Mismatch => error_codes::IDEMPOTENCY_MISMATCH,
        LedgerError::Internal(_) => error_codes::INTERNAL_ERROR,
    };
    (status, code)
}

/// Build the error response for a failed ledger operation
///
/// Internal errors are logged at error level and their detail is never
/// exposed to the client; everything else is an expected rejection.
pub fn error_response(err: &LedgerError) -> Response {
    match err {
        LedgerError::Internal(detail) => tracing::error!("Request failed: {}", detail),
        other => tracing::debug!("Request rejected: {}", other),
    }
    let (status, code) = map_error(err);
    (
        status,
        Json(ApiResponse::<()>::error(code, err.public_message())),
    )
        .into_response()
}
