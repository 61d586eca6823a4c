//! VFS Types
//!
//! Entries, listing views and errors for the virtual file system.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::language::{language_for, Language};
use crate::store::PersistedRecord;

/// VFS errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    #[error("{name} already exists")]
    DuplicateName { name: String },

    #[error("{name}: no such file")]
    NotFound { name: String },

    #[error("invalid file name '{name}'")]
    InvalidName { name: String },
}

/// One virtual file. The language is derived from the name on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
    pub content: String,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> Language {
        language_for(&self.name)
    }
}

/// Row of a file listing, as shown in the file list and tab bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    pub name: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

/// Point-in-time copy of one entry's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub name: String,
    pub content: String,
}

impl From<SnapshotEntry> for PersistedRecord {
    fn from(entry: SnapshotEntry) -> Self {
        PersistedRecord::new(entry.name, entry.content)
    }
}

impl From<PersistedRecord> for SnapshotEntry {
    fn from(record: PersistedRecord) -> Self {
        SnapshotEntry {
            name: record.file_name,
            content: record.content,
        }
    }
}

/// Convert a snapshot into the records written by a save.
pub fn to_records(snapshot: Vec<SnapshotEntry>) -> Vec<PersistedRecord> {
    snapshot.into_iter().map(PersistedRecord::from).collect()
}

/// Normalize a user-supplied file name. Surrounding whitespace is dropped.
pub fn normalize_name(name: &str) -> Result<String, VfsError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(VfsError::InvalidName { name: name.to_string() });
    }
    Ok(trimmed.to_string())
}
