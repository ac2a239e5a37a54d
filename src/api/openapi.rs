//! OpenAPI / Swagger UI Documentation
//!
//! This module provides auto-generated OpenAPI 3.0 documentation for the
//! ledger API.
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

// Import handler types for schema registration
use crate::api::handlers::HealthResponse;
use crate::api::types::{ApiResponse, CreateAccountRequest, CreateTransferRequest};
use crate::ledger::{Account, LedgerEntry, Transfer, TransferDocument, TransferStatus};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledgerd Transfer API",
        version = "0.1.0",
        description = "Double-entry fund transfer ledger with application-layer idempotency.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::transfers::create_transfer,
        crate::api::handlers::transfers::get_transfer,
        crate::api::handlers::accounts::create_account,
        crate::api::handlers::accounts::get_account,
        crate::api::handlers::accounts::get_account_entries,
    ),
    components(
        schemas(
            ApiResponse<TransferDocument>,
            HealthResponse,
            Account,
            Transfer,
            TransferStatus,
            LedgerEntry,
            TransferDocument,
            CreateTransferRequest,
            CreateAccountRequest,
        )
    ),
    tags(
        (name = "Transfers", description = "Idempotent fund transfer submission and lookup"),
        (name = "Accounts", description = "Account creation, lookup, and ledger entry history"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
