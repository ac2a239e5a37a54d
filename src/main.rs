//! ledgerd - double-entry fund transfer service
//!
//! This is the main entry point. Architecture:
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌──────────────┐
//! │   HTTP   │───▶│   Transfer   │───▶│  PostgreSQL  │
//! │  (axum)  │    │   Executor   │    │ (REPEATABLE  │
//! └──────────┘    │ (locks+idem) │    │    READ)     │
//!                 └──────────────┘    └──────────────┘
//! ```
//!
//! Executor responsibilities:
//! - Idempotency key reservation (replay before any lock)
//! - Deterministic account lock ordering (deadlock-free)
//! - Balanced entry pair + balance mutation in one transaction

use std::sync::Arc;

use anyhow::Context;

use ledgerd::api::{self, AppState};
use ledgerd::config::AppConfig;
use ledgerd::db::Database;
use ledgerd::ledger::{RetentionSweeper, SweeperConfig, TransferExecutor};
use ledgerd::logging::init_logging;
use ledgerd::store::LedgerStore;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env);
    let _log_guard = init_logging(&app_config);

    tracing::info!(
        "Starting ledgerd {} ({}) in {} mode",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env
    );

    // Connect and migrate before serving any traffic
    let db = Database::connect(&app_config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.migrate()
        .await
        .context("Failed to apply schema migrations")?;
    let db = Arc::new(db);

    let store = LedgerStore::new(db.pool().clone());
    let executor = Arc::new(TransferExecutor::new(
        store.clone(),
        app_config.ledger.lock_wait,
    ));

    // Background sweeper reclaims expired terminal idempotency keys
    let sweeper = RetentionSweeper::new(store, SweeperConfig::from(&app_config.idempotency));
    tokio::spawn(async move {
        sweeper.run().await;
    });

    // Allow --port override of the YAML config
    let port = get_port_override().unwrap_or(app_config.server.port);
    println!(
        "Ledgerd will listen on {}:{}",
        app_config.server.host, port
    );

    let state = Arc::new(AppState::new(db, executor));
    api::run_server(port, state).await;

    Ok(())
}
