//! Serial Vault Server Library
//!
//! Core functionality for the vault:
//! - `SQLite` storage for models, sub-stores, accounts and the signing log
//! - API-key authentication and user-scoped admin access
//! - The serial-assertion signing pipeline
//! - The HTTP API

pub mod auth;
pub mod server;
pub mod signing;
pub mod storage;
