//! Storage layer tests for the vault.

#![allow(clippy::unwrap_used)]

use super::db::VaultDatabase;
use super::models::{Model, NewModel, NewSigningLog, NewSubstore, role};
use super::scope::Scope;
use serialvault_core::db::DatabaseError;

async fn test_db() -> VaultDatabase {
    VaultDatabase::open_in_memory().await.unwrap()
}

async fn seed_model(db: &VaultDatabase, brand: &str, name: &str) -> Model {
    let key_id = format!("key-{brand}-{name}");
    let keypair = db.create_keypair(brand, &key_id, b"sealed").await.unwrap();
    db.create_model(
        &NewModel {
            brand_id: brand.into(),
            name: name.into(),
            revision: 1,
            keypair_id: keypair.id,
        },
        &Scope::Unscoped,
    )
    .await
    .unwrap()
}

fn mapping(account_id: i64, from_model_id: i64, serial: &str) -> NewSubstore {
    NewSubstore {
        account_id,
        from_model_id,
        store: "acme-store".into(),
        serial_number: serial.into(),
        model_name: "widget-pro".into(),
    }
}

/// Two accounts, each with a linked standard user.
async fn seed_tenants(db: &VaultDatabase) -> (i64, i64) {
    let acme = db.create_account("acme", "Acme").await.unwrap();
    let other = db.create_account("other", "Other").await.unwrap();
    let alice = db.create_user("alice", "Alice", role::STANDARD).await.unwrap();
    let bob = db.create_user("bob", "Bob", role::STANDARD).await.unwrap();
    db.link_user_account(alice.id, acme.id).await.unwrap();
    db.link_user_account(bob.id, other.id).await.unwrap();
    (acme.id, other.id)
}

// === Model tests ===

#[tokio::test]
async fn create_and_get_model() {
    let db = test_db().await;
    let model = seed_model(&db, "acme", "widget").await;

    assert_eq!(model.brand_id, "acme");
    assert_eq!(model.authority_id, "acme");
    assert!(model.key_active);

    let fetched = db.get_model(model.id, &Scope::Unscoped).await.unwrap();
    assert_eq!(fetched.key_id, "key-acme-widget");
    assert_eq!(fetched.sealed_key, b"sealed");
}

#[tokio::test]
async fn duplicate_model_names_the_tuple() {
    let db = test_db().await;
    let model = seed_model(&db, "acme", "widget").await;

    let err = db
        .create_model(
            &NewModel {
                brand_id: "acme".into(),
                name: "widget".into(),
                revision: 1,
                keypair_id: model.keypair_id,
            },
            &Scope::Unscoped,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DatabaseError::DuplicateModel { ref brand_id, ref name, revision: 1 }
            if brand_id == "acme" && name == "widget"
    ));
}

#[tokio::test]
async fn find_model_matches_revision() {
    let db = test_db().await;
    seed_model(&db, "acme", "widget").await;

    assert!(
        db.find_model("acme", "widget", 1, &Scope::Unscoped)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        db.find_model("acme", "widget", 2, &Scope::Unscoped)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn model_with_unknown_keypair_is_rejected() {
    let db = test_db().await;
    let err = db
        .create_model(
            &NewModel {
                brand_id: "acme".into(),
                name: "widget".into(),
                revision: 1,
                keypair_id: 99,
            },
            &Scope::Unscoped,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));
}

#[tokio::test]
async fn deactivating_keypair_reflects_on_model() {
    let db = test_db().await;
    let model = seed_model(&db, "acme", "widget").await;

    db.set_keypair_active(model.keypair_id, false).await.unwrap();

    let fetched = db.get_model(model.id, &Scope::Unscoped).await.unwrap();
    assert!(!fetched.key_active);
}

#[tokio::test]
async fn scoped_model_listing() {
    let db = test_db().await;
    seed_tenants(&db).await;
    seed_model(&db, "acme", "widget").await;
    seed_model(&db, "other", "gadget").await;

    assert_eq!(db.list_models(&Scope::Unscoped).await.unwrap().len(), 2);

    let alice = db.list_models(&Scope::user("alice")).await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].brand_id, "acme");

    assert!(db.list_models(&Scope::user("nobody")).await.unwrap().is_empty());
}

#[tokio::test]
async fn scoped_model_update_and_delete() {
    let db = test_db().await;
    seed_tenants(&db).await;
    let model = seed_model(&db, "other", "gadget").await;

    let update = NewModel {
        brand_id: "other".into(),
        name: "gadget-two".into(),
        revision: 1,
        keypair_id: model.keypair_id,
    };
    let err = db
        .update_model(model.id, &update, &Scope::user("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));

    let updated = db
        .update_model(model.id, &update, &Scope::user("bob"))
        .await
        .unwrap();
    assert_eq!(updated.name, "gadget-two");

    assert!(db.delete_model(model.id, &Scope::user("alice")).await.is_err());
    db.delete_model(model.id, &Scope::user("bob")).await.unwrap();
    assert!(db.get_model(model.id, &Scope::Unscoped).await.is_err());
}

#[tokio::test]
async fn model_referenced_by_substore_cannot_be_deleted() {
    let db = test_db().await;
    let (acme, _) = seed_tenants(&db).await;
    let model = seed_model(&db, "acme", "widget").await;
    db.create_substore(&mapping(acme, model.id, "S1"), &Scope::Unscoped)
        .await
        .unwrap();

    let err = db.delete_model(model.id, &Scope::Unscoped).await.unwrap_err();
    assert!(matches!(err, DatabaseError::ForeignKey(_)));
}

// === Sub-store tests ===

#[tokio::test]
async fn create_substore_embeds_originating_model() {
    let db = test_db().await;
    let (acme, _) = seed_tenants(&db).await;
    let model = seed_model(&db, "acme", "widget").await;

    let detail = db
        .create_substore(&mapping(acme, model.id, "S1"), &Scope::Unscoped)
        .await
        .unwrap();

    assert_eq!(detail.substore.model_name, "widget-pro");
    assert_eq!(detail.from_model.id, model.id);
    assert_eq!(detail.from_model.name, "widget");
}

#[tokio::test]
async fn duplicate_substore_fails_without_touching_the_first() {
    let db = test_db().await;
    let (acme, _) = seed_tenants(&db).await;
    let model = seed_model(&db, "acme", "widget").await;

    let first = db
        .create_substore(&mapping(acme, model.id, "S1"), &Scope::Unscoped)
        .await
        .unwrap();

    let mut second = mapping(acme, model.id, "S1");
    second.model_name = "widget-max".into();
    let err = db.create_substore(&second, &Scope::Unscoped).await.unwrap_err();

    assert!(matches!(
        err,
        DatabaseError::DuplicateMapping { from_model_id, ref serial_number, ref store }
            if from_model_id == model.id && serial_number == "S1" && store == "acme-store"
    ));

    let stores = db.list_substores(acme, &Scope::Unscoped).await.unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0], first);
}

#[tokio::test]
async fn update_into_existing_mapping_is_a_duplicate() {
    let db = test_db().await;
    let (acme, _) = seed_tenants(&db).await;
    let model = seed_model(&db, "acme", "widget").await;
    db.create_substore(&mapping(acme, model.id, "S1"), &Scope::Unscoped)
        .await
        .unwrap();
    let second = db
        .create_substore(&mapping(acme, model.id, "S2"), &Scope::Unscoped)
        .await
        .unwrap();

    let err = db
        .update_substore(second.substore.id, &mapping(acme, model.id, "S1"), &Scope::Unscoped)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicateMapping { .. }));

    let unchanged = db
        .get_substore(second.substore.id, &Scope::Unscoped)
        .await
        .unwrap();
    assert_eq!(unchanged.substore.serial_number, "S2");
}

#[tokio::test]
async fn pivot_lookup_requires_brand_name_and_serial() {
    let db = test_db().await;
    let (acme, _) = seed_tenants(&db).await;
    let model = seed_model(&db, "acme", "widget").await;
    db.create_substore(&mapping(acme, model.id, "S1"), &Scope::Unscoped)
        .await
        .unwrap();

    let found = db
        .find_substores_by_pivot("acme", "widget-pro", "S1", &Scope::Unscoped)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].from_model_id, model.id);

    for (brand, name, serial) in [
        ("other", "widget-pro", "S1"),
        ("acme", "widget", "S1"),
        ("acme", "widget-pro", "S2"),
    ] {
        assert!(
            db.find_substores_by_pivot(brand, name, serial, &Scope::Unscoped)
                .await
                .unwrap()
                .is_empty()
        );
    }
}

#[tokio::test]
async fn user_scope_hides_other_accounts() {
    let db = test_db().await;
    let (acme, _) = seed_tenants(&db).await;
    let model = seed_model(&db, "acme", "widget").await;
    let created = db
        .create_substore(&mapping(acme, model.id, "S1"), &Scope::Unscoped)
        .await
        .unwrap();
    let id = created.substore.id;

    assert!(db.get_substore(id, &Scope::user("alice")).await.is_ok());
    assert!(matches!(
        db.get_substore(id, &Scope::user("bob")).await,
        Err(DatabaseError::NotFound(_))
    ));
    assert!(db.list_substores(acme, &Scope::user("bob")).await.unwrap().is_empty());
    assert!(
        db.find_substores_by_pivot("acme", "widget-pro", "S1", &Scope::user("bob"))
            .await
            .unwrap()
            .is_empty()
    );

    assert!(db.delete_substore(id, &Scope::user("bob")).await.is_err());
    assert!(db.get_substore(id, &Scope::Unscoped).await.is_ok());

    db.delete_substore(id, &Scope::user("alice")).await.unwrap();
    assert!(db.get_substore(id, &Scope::Unscoped).await.is_err());
}

#[tokio::test]
async fn scoped_create_requires_account_link() {
    let db = test_db().await;
    let (acme, other) = seed_tenants(&db).await;
    let model = seed_model(&db, "acme", "widget").await;

    let err = db
        .create_substore(&mapping(acme, model.id, "S1"), &Scope::user("bob"))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));

    db.create_substore(&mapping(other, model.id, "S1"), &Scope::user("bob"))
        .await
        .unwrap();
}

#[tokio::test]
async fn scoped_update_cannot_move_mapping_to_foreign_account() {
    let db = test_db().await;
    let (acme, other) = seed_tenants(&db).await;
    let model = seed_model(&db, "acme", "widget").await;
    let created = db
        .create_substore(&mapping(acme, model.id, "S1"), &Scope::user("alice"))
        .await
        .unwrap();

    let err = db
        .update_substore(created.substore.id, &mapping(other, model.id, "S1"), &Scope::user("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));
}

// === Signing log tests ===

fn log_entry(serial: &str, fingerprint: &str) -> NewSigningLog {
    NewSigningLog {
        make: "acme".into(),
        model: "widget".into(),
        serial_number: serial.into(),
        fingerprint: fingerprint.into(),
    }
}

#[tokio::test]
async fn signing_log_insert_and_exists() {
    let db = test_db().await;
    assert!(!db.signing_log_exists("S1", "fp").await.unwrap());

    let log = db.insert_signing_log(&log_entry("S1", "fp")).await.unwrap();
    assert_eq!(log.serial_number, "S1");
    assert!(log.created_at > 0);

    assert!(db.signing_log_exists("S1", "fp").await.unwrap());
    assert!(!db.signing_log_exists("S1", "other-fp").await.unwrap());
}

#[tokio::test]
async fn signing_log_rejects_duplicate_pair() {
    let db = test_db().await;
    db.insert_signing_log(&log_entry("S1", "fp")).await.unwrap();

    let err = db.insert_signing_log(&log_entry("S1", "fp")).await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    assert_eq!(db.count_signing_logs().await.unwrap(), 1);

    // Same serial with a different key is a different device identity.
    db.insert_signing_log(&log_entry("S1", "fp2")).await.unwrap();
    assert_eq!(db.count_signing_logs().await.unwrap(), 2);
}

#[tokio::test]
async fn signing_logs_list_newest_first() {
    let db = test_db().await;
    for serial in ["S1", "S2", "S3"] {
        db.insert_signing_log(&log_entry(serial, "fp")).await.unwrap();
    }

    let logs = db.list_signing_logs(2, 0).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].serial_number, "S3");
    assert_eq!(logs[1].serial_number, "S2");
}

#[tokio::test]
async fn health_check_succeeds() {
    let db = test_db().await;
    db.health_check().await.unwrap();
}
