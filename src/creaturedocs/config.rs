use crate::error::{Result, StoreError};
use crate::store::DEFAULT_EXTENSION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

/// Store configuration, kept in `config.json` inside a config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Where documents live. When unset, the platform data directory is used.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Extension of document directories, without the dot (e.g. "scarycreature")
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            extension: default_extension(),
        }
    }
}

impl StoreConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(StoreError::Io)?;
        let config: StoreConfig =
            serde_json::from_str(&content).map_err(StoreError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(StoreError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(StoreError::Serialization)?;
        fs::write(config_path, content).map_err(StoreError::Io)?;
        Ok(())
    }

    /// Set the extension (normalizes away a leading dot)
    pub fn set_extension(&mut self, ext: &str) {
        self.extension = ext.trim_start_matches('.').to_string();
    }
}
