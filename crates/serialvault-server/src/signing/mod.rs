//! Serial-assertion signing.
//!
//! [`VaultContext::sign_serial`] sequences decoding, model resolution,
//! duplicate detection, signing and logging over injected capabilities.

pub mod error;
pub mod guard;
pub mod pipeline;
pub mod resolver;
pub mod store;


pub use error::{SignError, Stage};
pub use guard::{DuplicateGuard, RecordError};
pub use pipeline::{SerialRequest, Signed, VaultContext};
pub use resolver::{ModelIdentity, ModelResolver, ResolveError};
pub use store::{ModelCatalog, SigningLogStore};
