use condo_config::{Config, ConfigManager};
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    let config = manager.load().expect("load");
    assert_eq!(config.locale, "es-CL");
    assert_eq!(config.currency, "CLP");
    assert_eq!(config.backup_retention, 5);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut config = Config::default();
    config.currency = "UF".into();
    config.backup_retention = 9;
    config.default_data_root = Some(dir.path().join("snapshots"));
    manager.save(&config).expect("save");

    let loaded = manager.load().expect("load");
    assert_eq!(loaded.currency, "UF");
    assert_eq!(loaded.backup_retention, 9);
    assert_eq!(
        loaded.resolve_default_data_root(),
        dir.path().join("snapshots")
    );
    assert_eq!(
        loaded.resolve_default_backup_root(),
        dir.path().join("snapshots").join("backups")
    );
}

#[test]
fn partial_files_fill_in_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    std::fs::write(
        manager.config_path(),
        r#"{"locale": "en-US", "currency": "USD"}"#,
    )
    .expect("write raw config");

    let loaded = manager.load().expect("load");
    assert_eq!(loaded.locale, "en-US");
    assert_eq!(loaded.backup_retention, 5, "serde default applies");
}
