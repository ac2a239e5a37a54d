//! HTTP request handlers

pub mod accounts;
pub mod health;
pub mod transfers;

pub use accounts::{create_account, get_account, get_account_entries};
pub use health::{HealthResponse, health_check};
pub use transfers::{IDEMPOTENCY_KEY_HEADER, create_transfer, get_transfer};
