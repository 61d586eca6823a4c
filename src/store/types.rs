//! Durable Store Types
//!
//! Core types and the trait every persistent record container implements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Durable store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("store corrupt: {reason}")]
    Corrupt { reason: String },
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::Unavailable { reason: reason.into() }
    }

    pub fn corrupt(reason: impl Into<String>) -> Self {
        StoreError::Corrupt { reason: reason.into() }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable { reason: e.to_string() }
    }
}

/// One persisted file, keyed by `file_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub content: String,
}

impl PersistedRecord {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Location of a record container inside a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerName {
    pub database: String,
    pub container: String,
}

impl Default for ContainerName {
    fn default() -> Self {
        Self {
            database: "DXCodeDB".to_string(),
            container: "VFS".to_string(),
        }
    }
}

/// Abstract durable record store.
///
/// Every call round-trips to the backing storage; implementations keep no
/// read cache. A `load_all` issued after a completed `replace_all` on the same
/// store observes that call's records.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Acquire the store, creating the record container if it is absent.
    async fn open(&self) -> Result<(), StoreError>;

    /// Clear every stored record and write `records` as one logical operation.
    async fn replace_all(&self, records: &[PersistedRecord]) -> Result<(), StoreError>;

    /// Return every stored record, in the store's enumeration order.
    async fn load_all(&self) -> Result<Vec<PersistedRecord>, StoreError>;
}

/// Collapse records sharing a `file_name`, keeping the last value at the
/// position of the first occurrence.
pub fn dedup_records(records: &[PersistedRecord]) -> Vec<PersistedRecord> {
    let mut map: indexmap::IndexMap<&str, &str> = indexmap::IndexMap::new();
    for record in records {
        map.insert(record.file_name.as_str(), record.content.as_str());
    }
    map.into_iter()
        .map(|(name, content)| PersistedRecord::new(name, content))
        .collect()
}
