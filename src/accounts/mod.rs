//! Account management
//!
//! Creation and read-side queries for accounts and their ledger history.
//! Balance mutation is the ledger engine's job exclusively.

pub mod repository;

pub use repository::AccountRepository;
