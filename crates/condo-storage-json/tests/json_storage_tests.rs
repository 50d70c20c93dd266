use condo_core::storage::CondominiumStorage;
use condo_domain::{Condominium, Department};
use condo_storage_json::JsonCondoStorage;
use tempfile::tempdir;

fn storage(dir: &std::path::Path) -> JsonCondoStorage {
    JsonCondoStorage::new(dir.join("data"), dir.join("backups")).expect("create storage")
}

fn sample_condo() -> Condominium {
    let mut condo = Condominium::new("Edificio Mirador");
    condo.add_department(Department::new("DEPTO-101", "Ana", 50.0));
    condo.add_department(Department::new("DEPTO-201", "Luis", 450.0));
    condo
}

#[test]
fn saves_and_loads_a_snapshot() {
    let dir = tempdir().expect("tempdir");
    let storage = storage(dir.path());
    let condo = sample_condo();

    storage
        .save_condominium("Edificio Mirador", &condo)
        .expect("save");
    let loaded = storage
        .load_condominium("Edificio Mirador")
        .expect("load");

    assert_eq!(loaded.name, "Edificio Mirador");
    assert_eq!(loaded.departments.len(), 2);
    assert_eq!(loaded.id, condo.id);

    let path = storage.condominium_path("Edificio Mirador");
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("edificio-mirador.json")
    );
    assert!(path.exists());
    assert_eq!(
        storage.list_condominiums().expect("list"),
        vec!["edificio-mirador".to_string()]
    );
}

#[test]
fn overwriting_keeps_a_backup_of_the_previous_file() {
    let dir = tempdir().expect("tempdir");
    let storage = storage(dir.path());
    let mut condo = sample_condo();

    storage.save_condominium("mirador", &condo).expect("save");
    condo.add_department(Department::new("DEPTO-301", "Sofía", 120.0));
    storage
        .save_condominium("mirador", &condo)
        .expect("second save");

    let backups = storage.list_backups("mirador").expect("list backups");
    assert_eq!(backups.len(), 1, "first file was preserved");

    let restored = storage.restore_backup(&backups[0]).expect("restore");
    assert_eq!(restored.departments.len(), 2, "backup predates the change");
}

#[test]
fn explicit_backups_round_trip() {
    let dir = tempdir().expect("tempdir");
    let storage = storage(dir.path());
    let condo = sample_condo();
    storage.save_condominium("mirador", &condo).expect("save");

    let info = storage
        .backup_condominium("mirador", &condo, Some("before migration"))
        .expect("backup");
    assert!(info.id.contains("before-migration"));

    let backups = storage.list_backups("mirador").expect("list");
    assert!(backups.iter().any(|entry| entry.id == info.id));

    let restored = storage.restore_backup(&info).expect("restore");
    assert_eq!(restored.name, condo.name);
}

#[test]
fn retention_prunes_old_backups() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonCondoStorage::with_retention(
        dir.path().join("data"),
        dir.path().join("backups"),
        2,
    )
    .expect("create storage");
    let condo = sample_condo();

    for idx in 0..4 {
        storage
            .backup_condominium("mirador", &condo, Some(&format!("note-{idx}")))
            .expect("backup");
    }
    let backups = storage.list_backups("mirador").expect("list");
    assert!(backups.len() <= 2, "pruned to retention: {}", backups.len());
}

#[test]
fn delete_removes_the_snapshot_file() {
    let dir = tempdir().expect("tempdir");
    let storage = storage(dir.path());
    storage
        .save_condominium("mirador", &sample_condo())
        .expect("save");
    storage.delete_condominium("mirador").expect("delete");
    assert!(storage.list_condominiums().expect("list").is_empty());
    assert!(storage.load_condominium("mirador").is_err());
}
