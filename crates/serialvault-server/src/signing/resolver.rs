//! Model/sub-store resolution.
//!
//! A request names a model by brand and model name. That name is either the
//! canonical name of a model, or the pivot name of a sub-store mapping for
//! the request's serial number. Sub-store mappings win; either way the
//! result is the originating model, whose keypair signs. Mappings that
//! disagree on the originating model resolve to nothing.

use tracing::debug;

use super::store::ModelCatalog;
use crate::storage::{DatabaseError, Model, Scope};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no model or sub-store matches the request")]
    NotFound,

    /// A sub-store row points at a model that no longer resolves.
    #[error("sub-store {substore_id} references missing model {from_model_id}")]
    Inconsistent { substore_id: i64, from_model_id: i64 },

    /// Several mappings share the pivot but name different models.
    #[error("sub-store mappings point at several models: {from_model_ids:?}")]
    Ambiguous { from_model_ids: Vec<i64> },

    #[error("catalog lookup failed: {0}")]
    Storage(#[from] DatabaseError),
}

/// Identity a request addresses a model by.
#[derive(Debug, Clone, Copy)]
pub struct ModelIdentity<'a> {
    pub brand_id: &'a str,
    pub model_name: &'a str,
    pub serial_number: &'a str,
    pub revision: i64,
}

pub struct ModelResolver<'a, C> {
    catalog: &'a C,
}

impl<'a, C: ModelCatalog> ModelResolver<'a, C> {
    pub const fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Resolve `identity` to its originating model within `scope`.
    pub async fn resolve(
        &self,
        identity: &ModelIdentity<'_>,
        scope: &Scope,
    ) -> Result<Model, ResolveError> {
        let mappings = self
            .catalog
            .find_substores_by_pivot(
                identity.brand_id,
                identity.model_name,
                identity.serial_number,
                scope,
            )
            .await?;

        if let Some(substore) = mappings.first() {
            let mut from_model_ids: Vec<i64> = mappings.iter().map(|s| s.from_model_id).collect();
            from_model_ids.sort_unstable();
            from_model_ids.dedup();
            if from_model_ids.len() > 1 {
                return Err(ResolveError::Ambiguous { from_model_ids });
            }

            debug!(
                substore_id = substore.id,
                from_model_id = substore.from_model_id,
                "resolved through sub-store"
            );
            let inconsistent = ResolveError::Inconsistent {
                substore_id: substore.id,
                from_model_id: substore.from_model_id,
            };
            return match self
                .catalog
                .find_model_by_id(substore.from_model_id, scope)
                .await?
            {
                Some(model) if model.brand_id == identity.brand_id => Ok(model),
                _ => Err(inconsistent),
            };
        }

        self.catalog
            .find_model(identity.brand_id, identity.model_name, identity.revision, scope)
            .await?
            .ok_or(ResolveError::NotFound)
    }
}
