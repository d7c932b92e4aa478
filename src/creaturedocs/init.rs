use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::store::FileDocumentStore;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Name of the documents folder inside the platform data directory.
pub const DOCUMENTS_DIR: &str = "PrivateDocuments";

/// The platform data directory for the app, joined with [`DOCUMENTS_DIR`].
/// `None` when no home directory can be determined.
pub fn default_root() -> Option<PathBuf> {
    ProjectDirs::from("com", "scarycreatures", "ScaryCreatures")
        .map(|dirs| dirs.data_dir().join(DOCUMENTS_DIR))
}

/// Resolve where documents live for this config.
pub fn resolve_root(config: &StoreConfig) -> Result<PathBuf> {
    match &config.root {
        Some(root) => Ok(root.clone()),
        None => default_root()
            .ok_or_else(|| StoreError::Store("Could not determine data directory".to_string())),
    }
}

/// Build a filesystem-backed store from a config.
pub fn store_from_config(config: &StoreConfig) -> Result<FileDocumentStore> {
    let root = resolve_root(config)?;
    Ok(FileDocumentStore::new(root).with_extension(&config.extension))
}

/// Load `config.json` from `config_dir` (defaults if absent) and open the store.
pub fn open(config_dir: &Path) -> Result<FileDocumentStore> {
    let config = StoreConfig::load(config_dir)?;
    store_from_config(&config)
}
