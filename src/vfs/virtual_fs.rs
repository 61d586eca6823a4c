//! VFS Core
//!
//! The single source of truth for file identity, content and the active
//! file. Entries keep insertion order; that order drives the listing, the
//! snapshot and the successor chosen when the active entry is removed.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::events::*;
use super::language::{language_for, Language};
use super::types::*;

/// In-memory virtual file system.
///
/// Invariants: names are unique, and `active` (when set) names a live entry.
#[derive(Debug, Default)]
pub struct Vfs {
    entries: IndexMap<String, FileEntry>,
    active: Option<String>,
    bus: NotificationBus,
}

impl Vfs {
    /// Create an empty VFS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a file. Fails with `DuplicateName` if the name is taken, leaving
    /// the VFS untouched. Returns the stored (trimmed) name.
    pub fn create(&mut self, name: &str, content: &str, activate: bool) -> Result<String, VfsError> {
        let name = normalize_name(name)?;
        if self.entries.contains_key(&name) {
            warn!(name = %name, "file already exists");
            return Err(VfsError::DuplicateName { name });
        }

        debug!(name = %name, language = %language_for(&name), "creating file");
        self.entries.insert(name.clone(), FileEntry::new(name.clone(), content));
        if activate {
            self.set_active(&name);
        }
        self.publish(ChangeKind::EntriesChanged);
        Ok(name)
    }

    /// Make `name` the active file. Returns false (and does nothing) when the
    /// name is unknown or already active.
    pub fn set_active(&mut self, name: &str) -> bool {
        let name = name.trim();
        if !self.entries.contains_key(name) || self.active.as_deref() == Some(name) {
            return false;
        }
        self.active = Some(name.to_string());
        self.publish(ChangeKind::ActiveChanged);
        true
    }

    /// Remove a file and return it.
    ///
    /// If it was active, the entry that followed it becomes active; when it
    /// was last, the one before it does; an emptied VFS has no active file.
    pub fn remove(&mut self, name: &str) -> Result<FileEntry, VfsError> {
        let name = name.trim();
        let (index, _, entry) = self
            .entries
            .shift_remove_full(name)
            .ok_or_else(|| VfsError::NotFound { name: name.to_string() })?;

        let was_active = self.active.as_deref() == Some(name);
        if was_active {
            let successor = self
                .entries
                .get_index(index)
                .or_else(|| index.checked_sub(1).and_then(|i| self.entries.get_index(i)))
                .map(|(k, _)| k.clone());
            self.active = successor;
        }

        debug!(name = %name, active = ?self.active, "removed file");
        self.publish(ChangeKind::EntriesChanged);
        if was_active {
            self.publish(ChangeKind::ActiveChanged);
        }
        Ok(entry)
    }

    pub fn get_content(&self, name: &str) -> Result<&str, VfsError> {
        self.entries
            .get(name.trim())
            .map(|e| e.content.as_str())
            .ok_or_else(|| VfsError::NotFound { name: name.to_string() })
    }

    /// Replace a file's content. No notification and no persistence.
    pub fn set_content(&mut self, name: &str, content: impl Into<String>) -> Result<(), VfsError> {
        let entry = self
            .entries
            .get_mut(name.trim())
            .ok_or_else(|| VfsError::NotFound { name: name.to_string() })?;
        entry.content = content.into();
        Ok(())
    }

    pub fn language_for(&self, name: &str) -> Language {
        language_for(name)
    }

    pub fn list_entries(&self) -> Vec<EntryView> {
        self.entries
            .keys()
            .map(|name| EntryView {
                name: name.clone(),
                is_active: self.active.as_deref() == Some(name.as_str()),
            })
            .collect()
    }

    /// Copy every entry's current content, in insertion order.
    pub fn snapshot_all(&self) -> Vec<SnapshotEntry> {
        self.entries
            .values()
            .map(|e| SnapshotEntry {
                name: e.name().to_string(),
                content: e.content.clone(),
            })
            .collect()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_entry(&self) -> Option<&FileEntry> {
        self.active.as_deref().and_then(|name| self.entries.get(name))
    }

    pub fn entry(&self, name: &str) -> Option<&FileEntry> {
        self.entries.get(name.trim())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name.trim())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) -> SubscriptionId {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Publish a user-visible notice to every observer.
    pub fn notify(&mut self, notice: Notice) {
        self.publish(ChangeKind::Notice(notice));
    }

    fn publish(&mut self, kind: ChangeKind) {
        if self.bus.is_empty() {
            return;
        }
        let event = ChangeEvent {
            kind,
            entries: self.list_entries(),
            active: self.active.clone(),
        };
        self.bus.publish(&event);
    }
}
