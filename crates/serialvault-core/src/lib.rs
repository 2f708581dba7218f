//! Serial Vault Core Library
//!
//! Shared functionality for the vault crates:
//! - Configuration resolution and hierarchy
//! - Error taxonomy reported to callers
//! - `SQLite` pool helpers and the storage error type
//! - Tracing initialisation

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
