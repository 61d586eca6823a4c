//! JSON File Store Implementation
//!
//! Persists the record container as a JSON array on disk:
//! `<root>/<database>/<container>.json`. Replacement is written to a private
//! temporary file in the same directory and renamed over the container, so a
//! reader sees either the previous record set or the new one.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::types::*;

/// On-disk durable store.
pub struct JsonFileStore {
    dir: PathBuf,
    file: PathBuf,
    save_gate: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store rooted at `root` for the given container.
    pub fn new(root: impl AsRef<Path>, name: &ContainerName) -> Self {
        let dir = root.as_ref().join(&name.database);
        let file = dir.join(format!("{}.json", name.container));
        Self {
            dir,
            file,
            save_gate: Mutex::new(()),
        }
    }

    /// Path of the container file.
    pub fn container_path(&self) -> &Path {
        &self.file
    }

    /// Write `bytes` to a fresh temporary file next to the container and
    /// move it into place. Every call gets its own temp file, so writers on
    /// other handles or in other processes never share one. With `replace`
    /// false an existing container is left alone.
    async fn write_atomically(&self, bytes: Vec<u8>, replace: bool) -> Result<(), StoreError> {
        let dir = self.dir.clone();
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::Builder::new()
                .prefix(".records-")
                .suffix(".tmp")
                .tempfile_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            if replace {
                tmp.persist(&file)?;
            } else if let Err(e) = tmp.persist_noclobber(&file) {
                if e.error.kind() != ErrorKind::AlreadyExists {
                    return Err(e.into());
                }
            }
            Ok(())
        })
        .await
        .map_err(|e| StoreError::unavailable(format!("save task failed: {}", e)))??;
        Ok(())
    }
}

#[async_trait]
impl DurableStore for JsonFileStore {
    async fn open(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        match tokio::fs::metadata(&self.file).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(StoreError::unavailable(format!(
                "{} is not a file",
                self.file.display()
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let _gate = self.save_gate.lock().await;
                // Another writer may have created the container while we waited.
                if tokio::fs::try_exists(&self.file).await? {
                    return Ok(());
                }
                debug!(path = %self.file.display(), "creating record container");
                self.write_atomically(b"[]".to_vec(), false).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_all(&self, records: &[PersistedRecord]) -> Result<(), StoreError> {
        self.open().await?;
        let records = dedup_records(records);
        let bytes = serde_json::to_vec_pretty(&records)
            .map_err(|e| StoreError::corrupt(e.to_string()))?;

        let _gate = self.save_gate.lock().await;
        self.write_atomically(bytes, true).await?;
        debug!(count = records.len(), path = %self.file.display(), "replaced records");
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PersistedRecord>, StoreError> {
        self.open().await?;
        let bytes = tokio::fs::read(&self.file).await?;
        let records: Vec<PersistedRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::corrupt(format!("{}: {}", self.file.display(), e)))?;
        debug!(count = records.len(), path = %self.file.display(), "loaded records");
        Ok(records)
    }
}
