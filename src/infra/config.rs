use crate::domain::ConfigStore;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.json";

pub fn default_config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config/wocker/plugins/elastic")
}

/// Expands a leading `~` so paths coming from env vars behave like shell paths
pub fn expand_config_dir(config_dir: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(config_dir.to_string_lossy().as_ref()).into_owned())
}

pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    fs::create_dir_all(config_dir).with_context(|| format!("creating {:?}", config_dir))
}

/// Stores the plugin document as pretty-printed JSON in `<dir>/config.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(CONFIG_FILE_NAME),
        }
    }
}

impl ConfigStore for JsonFileStore {
    fn read(&self) -> Result<Option<Value>> {
        if !self.path.exists() {
            debug!("No config at {:?}, starting empty", self.path);
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.path).with_context(|| format!("reading {:?}", self.path))?;
        let document =
            serde_json::from_str(&content).with_context(|| format!("parsing {:?}", self.path))?;

        Ok(Some(document))
    }

    fn write(&self, document: &Value) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            ensure_config_dir(dir)?;
        }

        let content = serde_json::to_string_pretty(document)
            .with_context(|| format!("serializing {:?}", self.path))?;

        fs::write(&self.path, content).with_context(|| format!("writing {:?}", self.path))
    }
}
