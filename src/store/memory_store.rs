//! In-Memory Store Implementation
//!
//! A process-local record container. Useful for tests and for hosts that
//! have no durable storage; the availability switch simulates a platform
//! that denies storage access.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::types::*;

/// In-memory durable store.
pub struct InMemoryStore {
    data: RwLock<Option<IndexMap<String, String>>>,
    available: AtomicBool,
}

impl InMemoryStore {
    /// Create a new store with no container yet.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(None),
            available: AtomicBool::new(true),
        }
    }

    /// Create a store whose container already holds `records`.
    pub fn with_records(records: &[PersistedRecord]) -> Self {
        let map = records
            .iter()
            .map(|r| (r.file_name.clone(), r.content.clone()))
            .collect();
        Self {
            data: RwLock::new(Some(map)),
            available: AtomicBool::new(true),
        }
    }

    /// Create a store that refuses every operation.
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_available(false);
        store
    }

    /// Toggle whether the store accepts operations.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.data.read().await.as_ref().map_or(0, |m| m.len())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable("storage access denied"))
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableStore for InMemoryStore {
    async fn open(&self) -> Result<(), StoreError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        if data.is_none() {
            *data = Some(IndexMap::new());
        }
        Ok(())
    }

    async fn replace_all(&self, records: &[PersistedRecord]) -> Result<(), StoreError> {
        self.check_available()?;
        let replacement: IndexMap<String, String> = records
            .iter()
            .map(|r| (r.file_name.clone(), r.content.clone()))
            .collect();
        // Swap under one write lock so readers never see a partial set.
        *self.data.write().await = Some(replacement);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PersistedRecord>, StoreError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .as_ref()
            .map(|m| {
                m.iter()
                    .map(|(name, content)| PersistedRecord::new(name.as_str(), content.as_str()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
