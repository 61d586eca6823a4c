//! Workspace Configuration
//!
//! Options for a workspace session, loadable from a TOML file. Every field
//! has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::ContainerName;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Options for a workspace session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceOptions {
    /// Flush to the durable store after every create and remove.
    pub save_on_write: bool,
    /// Directory holding the store databases (defaults to the user data dir)
    pub store_root: Option<PathBuf>,
    /// Database name
    pub database: String,
    /// Record container name within the database
    pub container: String,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        let name = ContainerName::default();
        Self {
            save_on_write: false,
            store_root: None,
            database: name.database,
            container: name.container,
        }
    }
}

impl WorkspaceOptions {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn container_name(&self) -> ContainerName {
        ContainerName {
            database: self.database.clone(),
            container: self.container.clone(),
        }
    }

    /// Store root, falling back to `<data dir>/dxcode`, then `./.dxcode`.
    pub fn resolved_store_root(&self) -> PathBuf {
        if let Some(root) = &self.store_root {
            return root.clone();
        }
        dirs::data_dir()
            .map(|d| d.join("dxcode"))
            .unwrap_or_else(|| PathBuf::from(".dxcode"))
    }
}
