use serde::Deserialize;
use std::fs;

use crate::store::WaitMode;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

/// Transfer execution tuning.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LedgerConfig {
    /// Row-lock strategy: `block` queues on contended accounts, `nowait`
    /// fails fast with a retryable conflict.
    #[serde(default)]
    pub lock_wait: WaitMode,
}

/// Idempotency key retention.
#[derive(Debug, Deserialize, Clone)]
pub struct IdempotencyConfig {
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_sweep_batch_size")]
    pub sweep_batch_size: i64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            retention_hours: default_retention_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
            sweep_batch_size: default_sweep_batch_size(),
        }
    }
}

fn default_max_connections() -> u32 {
    50
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_retention_hours() -> u64 {
    48
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_sweep_batch_size() -> i64 {
    1000
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}
