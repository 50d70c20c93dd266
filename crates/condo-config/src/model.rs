use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Stores installation-wide preferences and data locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for snapshots. Defaults to
    /// `~/Documents/Condominiums`.
    pub default_data_root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for backups. Defaults to
    /// `~/Documents/Condominiums/backups`.
    pub default_backup_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "es-CL".into(),
            currency: "CLP".into(),
            backup_retention: Self::default_backup_retention(),
            default_data_root: None,
            default_backup_root: None,
        }
    }
}

impl Config {
    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_default_data_root(&self) -> PathBuf {
        if let Some(path) = &self.default_data_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("Condominiums")
    }

    pub fn resolve_default_backup_root(&self) -> PathBuf {
        if let Some(path) = &self.default_backup_root {
            return path.clone();
        }

        self.resolve_default_data_root().join("backups")
    }
}
