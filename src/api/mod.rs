//! HTTP API server
//!
//! Exposes the transfer ledger over REST:
//!
//! - `POST /api/v1/transfers` — idempotent transfer submission
//! - `GET  /api/v1/transfers/{transfer_id}` — transfer + entry pair lookup
//! - `POST /api/v1/accounts` — account creation
//! - `GET  /api/v1/accounts/{account_id}` — account lookup
//! - `GET  /api/v1/accounts/{account_id}/entries` — entry history
//! - `GET  /api/v1/health` — liveness + DB ping
//!
//! Swagger UI is served at `/docs`.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

pub use state::AppState;
pub use types::{ApiResponse, error_codes};

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Start the HTTP API server
pub async fn run_server(port: u16, state: Arc<AppState>) {
    let api_routes = Router::new()
        // Transfers
        .route("/transfers", post(handlers::create_transfer))
        .route("/transfers/{transfer_id}", get(handlers::get_transfer))
        // Accounts
        .route("/accounts", post(handlers::create_account))
        .route("/accounts/{account_id}", get(handlers::get_account))
        .route(
            "/accounts/{account_id}/entries",
            get(handlers::get_account_entries),
        )
        // System
        .route("/health", get(handlers::health_check));

    let app = Router::new()
        .nest("/api/v1", api_routes)
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()));

    // Bind address
    let addr = format!("0.0.0.0:{}", port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                port, port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Ledger API listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    // Start server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
