//! SQLite storage for the vault.
//!
//! The catalog (keypairs, models, accounts, sub-stores) and the append-only
//! signing log share one transactional database.

mod db;
mod models;
mod queries_accounts;
mod queries_models;
mod queries_signing_log;
mod queries_substores;
mod scope;

#[cfg(test)]
mod tests;

pub use db::VaultDatabase;
pub use models::*;
pub use scope::Scope;
pub use serialvault_core::db::DatabaseError;
