//! Seed demo/benchmark accounts
//!
//! Usage:
//!   cargo run --bin seed_accounts                              (1000 accounts @ 10000)
//!   cargo run --bin seed_accounts -- --count 50 --balance 250000
//!   cargo run --bin seed_accounts -- --env prod

use anyhow::Context;

use ledgerd::config::AppConfig;
use ledgerd::db::Database;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn get_arg(name: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == name && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let count: i64 = get_arg("--count")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1000);
    let balance: i64 = get_arg("--balance")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10_000);

    let config = AppConfig::load(&env);
    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.migrate()
        .await
        .context("Failed to apply schema migrations")?;

    // Single round trip; the balance CHECK constraint rejects negatives
    let inserted = sqlx::query(
        r#"INSERT INTO accounts (owner_name, balance)
           SELECT 'seed_user_' || n, $1
           FROM generate_series(1, $2) AS n"#,
    )
    .bind(balance)
    .bind(count)
    .execute(db.pool())
    .await
    .context("Seeding failed")?
    .rows_affected();

    println!(
        "✅ Seeded {} accounts with opening balance {}",
        inserted, balance
    );
    Ok(())
}
