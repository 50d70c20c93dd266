//! condo-storage-json
//!
//! Filesystem-backed JSON persistence for condominium snapshots and their
//! backups. The document database behind the deployed system provides the
//! same snapshot semantics; this backend keeps local installations and
//! tests on identical footing.

use std::{
    cmp::Reverse,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use condo_core::{
    storage::{CondoBackupInfo, CondominiumStorage},
    CoreError,
};
use condo_domain::Condominium;

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for condominium snapshots.
#[derive(Clone)]
pub struct JsonCondoStorage {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonCondoStorage {
    pub fn new(data_dir: PathBuf, backups_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(data_dir, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        data_dir: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self, CoreError> {
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            data_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn condominium_path(&self, name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", canonical_name(name), FILE_EXTENSION))
    }

    pub fn backup_path(&self, name: &str, backup: &str) -> PathBuf {
        self.backup_dir(name).join(backup)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn write_backup_file(
        &self,
        condo: &Condominium,
        name: &str,
        note: Option<&str>,
    ) -> Result<CondoBackupInfo, CoreError> {
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = format!("{}.{}", stem, FILE_EXTENSION);
        let path = dir.join(&file_name);
        write_atomic(&path, &serialize_condominium(condo)?)?;
        self.prune_backups(name)?;
        Ok(CondoBackupInfo {
            condominium: canonical_name(name),
            id: file_name,
            created_at: timestamp,
            path,
        })
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!(
            "{}_{}.{}",
            canonical_name(name),
            timestamp,
            FILE_EXTENSION
        );
        let backup_path = dir.join(&file_name);
        fs::copy(path, &backup_path)?;
        self.prune_backups(name)?;
        Ok(())
    }

    fn prune_backups(&self, name: &str) -> Result<(), CoreError> {
        let entries = self.list_backups(name)?;
        for entry in entries.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl CondominiumStorage for JsonCondoStorage {
    fn save_condominium(&self, name: &str, condo: &Condominium) -> Result<(), CoreError> {
        let path = self.condominium_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if path.exists() {
            self.backup_existing_file(name, &path)?;
        }
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &serialize_condominium(condo)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load_condominium(&self, name: &str) -> Result<Condominium, CoreError> {
        load_condominium_from_path(&self.condominium_path(name))
    }

    fn list_condominiums(&self) -> Result<Vec<String>, CoreError> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_condominium(&self, name: &str) -> Result<(), CoreError> {
        let path = self.condominium_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn save_to_path(&self, condo: &Condominium, path: &Path) -> Result<(), CoreError> {
        save_condominium_to_path(condo, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Condominium, CoreError> {
        load_condominium_from_path(path)
    }

    fn backup_condominium(
        &self,
        name: &str,
        condo: &Condominium,
        note: Option<&str>,
    ) -> Result<CondoBackupInfo, CoreError> {
        self.write_backup_file(condo, name, note)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<CondoBackupInfo>, CoreError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let slug = canonical_name(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(CondoBackupInfo {
                    condominium: slug.clone(),
                    id: file_name.to_string(),
                    created_at: file_name.to_string(),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse(info.id.clone()));
        Ok(entries)
    }

    fn restore_backup(&self, backup: &CondoBackupInfo) -> Result<Condominium, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let target = self.condominium_path(&backup.condominium);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&backup.path, &target)?;
        load_condominium_from_path(&target)
    }
}

/// Saves a snapshot to an arbitrary path on disk.
pub fn save_condominium_to_path(condo: &Condominium, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_condominium(condo)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a snapshot from the provided filesystem path.
pub fn load_condominium_from_path(path: &Path) -> Result<Condominium, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Storage(err.to_string()))
}

fn serialize_condominium(condo: &Condominium) -> Result<String, CoreError> {
    serde_json::to_string_pretty(condo).map_err(|err| CoreError::Storage(err.to_string()))
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), CoreError> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(".");
    os_string.push(TMP_SUFFIX);
    PathBuf::from(os_string)
}

fn canonical_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if matches!(ch, ' ' | '-' | '_' | '.') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "condominium".to_string()
    } else {
        trimmed.to_string()
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let cleaned = canonical_name(note?);
    if cleaned == "condominium" {
        None
    } else {
        Some(cleaned)
    }
}
