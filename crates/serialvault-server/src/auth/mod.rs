//! Caller authentication for the vault.
//!
//! Provides API-key checks and admin scope resolution.

pub mod api_key;
pub mod caller;

pub use api_key::check_api_key;
pub use caller::{AuthError, resolve_admin_scope};
