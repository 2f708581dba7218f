//! Data models for vault storage.

use serde::{Deserialize, Serialize};

/// User roles, ordered by privilege.
pub mod role {
    pub const STANDARD: i64 = 100;
    pub const ADMIN: i64 = 200;
    pub const SUPERUSER: i64 = 300;
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Keypair {
    pub id: i64,
    pub authority_id: String,
    pub key_id: String,
    #[serde(skip)]
    pub sealed_key: Vec<u8>,
    pub active: bool,
    pub created_at: i64,
}

/// A registered model joined with its signing keypair.
#[derive(Clone, sqlx::FromRow)]
pub struct Model {
    pub id: i64,
    pub brand_id: String,
    pub name: String,
    pub revision: i64,
    pub keypair_id: i64,
    pub authority_id: String,
    pub key_id: String,
    pub sealed_key: Vec<u8>,
    pub key_active: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("brand_id", &self.brand_id)
            .field("name", &self.name)
            .field("revision", &self.revision)
            .field("keypair_id", &self.keypair_id)
            .field("authority_id", &self.authority_id)
            .field("key_id", &self.key_id)
            .field("sealed_key", &"[REDACTED]")
            .field("key_active", &self.key_active)
            .finish()
    }
}

impl Model {
    /// Public view of the model, without key material.
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            id: self.id,
            brand_id: self.brand_id.clone(),
            name: self.name.clone(),
            revision: self.revision,
            keypair_id: self.keypair_id,
            authority_id: self.authority_id.clone(),
            key_id: self.key_id.clone(),
            key_active: self.key_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub id: i64,
    #[serde(rename = "brand-id")]
    pub brand_id: String,
    #[serde(rename = "model")]
    pub name: String,
    pub revision: i64,
    #[serde(rename = "keypair-id")]
    pub keypair_id: i64,
    #[serde(rename = "authority-id")]
    pub authority_id: String,
    #[serde(rename = "key-id")]
    pub key_id: String,
    #[serde(rename = "key-active")]
    pub key_active: bool,
}

/// Fields accepted when creating or updating a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewModel {
    #[serde(rename = "brand-id")]
    pub brand_id: String,
    #[serde(rename = "model")]
    pub name: String,
    #[serde(default)]
    pub revision: i64,
    #[serde(rename = "keypair-id")]
    pub keypair_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Substore {
    pub id: i64,
    #[serde(rename = "accountID")]
    pub account_id: i64,
    #[serde(rename = "fromModelID")]
    pub from_model_id: i64,
    pub store: String,
    #[serde(rename = "serialnumber")]
    pub serial_number: String,
    #[serde(rename = "modelname")]
    pub model_name: String,
}

/// Fields accepted when creating or updating a sub-store mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubstore {
    #[serde(rename = "accountID")]
    pub account_id: i64,
    #[serde(rename = "fromModelID")]
    pub from_model_id: i64,
    pub store: String,
    #[serde(rename = "serialnumber")]
    pub serial_number: String,
    #[serde(rename = "modelname")]
    pub model_name: String,
}

/// A sub-store with its originating model embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstoreDetail {
    #[serde(flatten)]
    pub substore: Substore,
    #[serde(rename = "fromModel")]
    pub from_model: ModelSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub authority_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub role: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SigningLog {
    pub id: i64,
    pub make: String,
    pub model: String,
    #[serde(rename = "serialnumber")]
    pub serial_number: String,
    pub fingerprint: String,
    pub created_at: i64,
}

/// A signing-log entry about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSigningLog {
    pub make: String,
    pub model: String,
    pub serial_number: String,
    pub fingerprint: String,
}
