use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::bootstrap::{bootstrap, seed_defaults, BootstrapOutcome};
use crate::config::WorkspaceOptions;
use crate::export::{build_archive, read_archive, ExportError, PreviewBundle};
use crate::store::{DurableStore, StoreError};
use crate::surface::{BufferHandle, EditingSurface};
use crate::vfs::*;

/// The application shell: sole owner of the VFS, the durable store handle
/// and the editing surface.
///
/// Every entry is paired with one editor buffer. Buffers are opened when an
/// entry is created and released when it is removed or the workspace drops.
pub struct Workspace {
    vfs: Vfs,
    store: Arc<dyn DurableStore>,
    surface: Box<dyn EditingSurface>,
    buffers: HashMap<String, BufferHandle>,
    options: WorkspaceOptions,
    save_failing: bool,
    outcome: BootstrapOutcome,
}

impl Workspace {
    /// Bootstrap a workspace from `store`, falling back to the starter
    /// project, and bind every entry to a buffer on `surface`.
    pub async fn open(
        store: Arc<dyn DurableStore>,
        surface: Box<dyn EditingSurface>,
        options: WorkspaceOptions,
    ) -> Self {
        let mut vfs = Vfs::new();
        let outcome = bootstrap(&mut vfs, store.as_ref()).await;
        let mut workspace = Self {
            vfs,
            store,
            surface,
            buffers: HashMap::new(),
            options,
            save_failing: false,
            outcome,
        };
        for name in &names_of(&workspace.vfs) {
            workspace.bind_buffer(name);
        }
        workspace.show_active();
        info!(files = workspace.vfs.len(), restored = workspace.outcome.is_restored(), "workspace ready");
        workspace
    }

    pub fn bootstrap_outcome(&self) -> &BootstrapOutcome {
        &self.outcome
    }

    pub fn options(&self) -> &WorkspaceOptions {
        &self.options
    }

    /// Read-only view of the VFS.
    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a file. A refused create is published as a notice and returned.
    pub async fn create(&mut self, name: &str, content: &str, activate: bool) -> Result<String, VfsError> {
        let name = match self.vfs.create(name, content, activate) {
            Ok(name) => name,
            Err(e) => return Err(self.reject(e)),
        };
        self.bind_buffer(&name);
        if activate {
            self.show_active();
        }
        self.flush_on_write().await;
        Ok(name)
    }

    /// Switch the active file. Unknown or already-active names are a no-op.
    pub fn set_active(&mut self, name: &str) -> bool {
        let changed = self.vfs.set_active(name);
        if changed {
            self.show_active();
        }
        changed
    }

    /// Remove a file and release its buffer.
    pub async fn remove(&mut self, name: &str) -> Result<(), VfsError> {
        let name = name.trim();
        let was_active = self.vfs.active_name() == Some(name);
        if let Err(e) = self.vfs.remove(name) {
            return Err(self.reject(e));
        }
        if let Some(handle) = self.buffers.remove(name) {
            self.surface.release_buffer(handle);
        }
        if was_active {
            self.show_active();
        }
        self.flush_on_write().await;
        Ok(())
    }

    /// Current content of a file, read from its editor buffer.
    pub fn get_content(&self, name: &str) -> Result<String, VfsError> {
        let name = name.trim();
        let stored = self.vfs.get_content(name)?;
        Ok(self
            .buffers
            .get(name)
            .and_then(|h| self.surface.buffer_text(*h))
            .unwrap_or_else(|| stored.to_string()))
    }

    /// Replace a file's content in the VFS and its buffer. Not persisted
    /// until the next save.
    pub fn set_content(&mut self, name: &str, content: &str) -> Result<(), VfsError> {
        let name = name.trim();
        self.vfs.set_content(name, content)?;
        if let Some(handle) = self.buffers.get(name) {
            self.surface.set_buffer_text(*handle, content);
        }
        Ok(())
    }

    /// Buffer-changed callback: copy the buffer's text into its entry.
    pub fn buffer_changed(&mut self, handle: BufferHandle) -> Result<(), VfsError> {
        let name = self
            .buffers
            .iter()
            .find(|(_, h)| **h == handle)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| VfsError::NotFound { name: format!("buffer {}", handle.0) })?;
        let text = self.surface.buffer_text(handle).unwrap_or_default();
        self.vfs.set_content(&name, text)
    }

    /// Remove everything and seed the starter project, then save.
    pub async fn reset(&mut self) -> Result<(), StoreError> {
        for (_, handle) in self.buffers.drain() {
            self.surface.release_buffer(handle);
        }
        for name in &names_of(&self.vfs) {
            let _ = self.vfs.remove(name);
        }
        seed_defaults(&mut self.vfs);
        for name in &names_of(&self.vfs) {
            self.bind_buffer(name);
        }
        self.show_active();
        self.save().await
    }

    /// Create one file per archive entry. Names that already exist are
    /// reported and skipped; returns the names created.
    pub async fn import_archive(&mut self, data: &[u8]) -> Result<Vec<String>, ExportError> {
        let mut created = Vec::new();
        for entry in read_archive(data)? {
            if let Ok(name) = self.create_unflushed(&entry.name, &entry.content) {
                created.push(name);
            }
        }
        if !created.is_empty() {
            self.flush_on_write().await;
        }
        Ok(created)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the current snapshot to the durable store.
    ///
    /// On failure the in-memory state is untouched and a `SaveFailed` notice
    /// is published, once per run of consecutive failures.
    pub async fn save(&mut self) -> Result<(), StoreError> {
        let records = to_records(self.snapshot_all());
        match self.store.replace_all(&records).await {
            Ok(()) => {
                self.save_failing = false;
                info!(files = records.len(), "project saved");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                if !self.save_failing {
                    self.save_failing = true;
                    self.vfs.notify(Notice::SaveFailed { reason: e.to_string() });
                }
                Err(e)
            }
        }
    }

    // ========================================================================
    // Presentation & export interface
    // ========================================================================

    pub fn list_entries(&self) -> Vec<EntryView> {
        self.vfs.list_entries()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.vfs.active_name()
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) -> SubscriptionId {
        self.vfs.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.vfs.unsubscribe(id)
    }

    /// Buffer bound to a file, if any.
    pub fn buffer_of(&self, name: &str) -> Option<BufferHandle> {
        self.buffers.get(name.trim()).copied()
    }

    /// Point-in-time copy of every file's current content.
    pub fn snapshot_all(&self) -> Vec<SnapshotEntry> {
        self.vfs
            .names()
            .map(|name| SnapshotEntry {
                name: name.to_string(),
                content: self.get_content(name).unwrap_or_default(),
            })
            .collect()
    }

    /// Preview is offered only while an HTML file is active.
    pub fn preview_available(&self) -> bool {
        self.vfs.active_name().and_then(extension) == Some("html")
    }

    pub fn preview_bundle(&self) -> PreviewBundle {
        PreviewBundle::from_snapshot(&self.snapshot_all())
    }

    pub fn export_archive(&self) -> Result<Vec<u8>, ExportError> {
        build_archive(&self.snapshot_all())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn create_unflushed(&mut self, name: &str, content: &str) -> Result<String, VfsError> {
        match self.vfs.create(name, content, false) {
            Ok(name) => {
                self.bind_buffer(&name);
                Ok(name)
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    fn reject(&mut self, e: VfsError) -> VfsError {
        self.vfs.notify(Notice::Rejected { message: e.to_string() });
        e
    }

    fn bind_buffer(&mut self, name: &str) {
        if self.buffers.contains_key(name) {
            return;
        }
        if let Ok(content) = self.vfs.get_content(name) {
            let handle = self.surface.open_buffer(content, language_for(name));
            self.buffers.insert(name.to_string(), handle);
        }
    }

    /// Show the active buffer, recomputing its language from the name.
    fn show_active(&mut self) {
        let active = self.vfs.active_name().map(str::to_string);
        let handle = active.as_deref().and_then(|name| self.buffers.get(name).copied());
        if let (Some(name), Some(handle)) = (active.as_deref(), handle) {
            self.surface.set_language_mode(handle, language_for(name));
        }
        self.surface.show(handle);
        debug!(active = ?active, "active file shown");
    }

    async fn flush_on_write(&mut self) {
        if self.options.save_on_write {
            // Failures are surfaced as a notice by `save`.
            let _ = self.save().await;
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        for (_, handle) in self.buffers.drain() {
            self.surface.release_buffer(handle);
        }
    }
}

fn names_of(vfs: &Vfs) -> Vec<String> {
    vfs.names().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, PersistedRecord};
    use crate::surface::HeadlessSurface;
    use std::sync::Mutex;

    /// Surface wrapper that exposes the headless state to assertions.
    #[derive(Clone, Default)]
    struct SharedSurface(Arc<Mutex<HeadlessSurface>>);

    impl EditingSurface for SharedSurface {
        fn open_buffer(&mut self, text: &str, language: Language) -> BufferHandle {
            self.0.lock().unwrap().open_buffer(text, language)
        }
        fn buffer_text(&self, handle: BufferHandle) -> Option<String> {
            self.0.lock().unwrap().buffer_text(handle)
        }
        fn set_buffer_text(&mut self, handle: BufferHandle, text: &str) {
            self.0.lock().unwrap().set_buffer_text(handle, text)
        }
        fn set_language_mode(&mut self, handle: BufferHandle, language: Language) {
            self.0.lock().unwrap().set_language_mode(handle, language)
        }
        fn show(&mut self, handle: Option<BufferHandle>) {
            self.0.lock().unwrap().show(handle)
        }
        fn release_buffer(&mut self, handle: BufferHandle) {
            self.0.lock().unwrap().release_buffer(handle)
        }
    }

    async fn open_with(store: Arc<InMemoryStore>, options: WorkspaceOptions) -> (Workspace, SharedSurface) {
        let surface = SharedSurface::default();
        let ws = Workspace::open(store, Box::new(surface.clone()), options).await;
        (ws, surface)
    }

    fn notices(ws: &mut Workspace) -> Arc<Mutex<Vec<Notice>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        ws.subscribe(Box::new(move |e: &ChangeEvent| {
            if let ChangeKind::Notice(n) = &e.kind {
                sink.lock().unwrap().push(n.clone());
            }
        }));
        seen
    }

    #[tokio::test]
    async fn test_open_binds_and_shows_active() {
        let (ws, surface) = open_with(Arc::new(InMemoryStore::new()), WorkspaceOptions::default()).await;
        let surface = surface.0.lock().unwrap();
        assert_eq!(surface.open_buffers(), 3);
        let index = ws.buffer_of("index.html").unwrap();
        assert_eq!(surface.shown(), Some(index));
        assert_eq!(surface.language_of(index), Some(Language::Html));
        assert!(ws.preview_available());
    }

    #[tokio::test]
    async fn test_set_active_pushes_language() {
        let (mut ws, surface) = open_with(Arc::new(InMemoryStore::new()), WorkspaceOptions::default()).await;
        assert!(ws.set_active("script.js"));
        let handle = ws.buffer_of("script.js").unwrap();
        {
            let mut s = surface.0.lock().unwrap();
            assert_eq!(s.shown(), Some(handle));
            // Language is recomputed on activation, not cached.
            s.set_language_mode(handle, Language::PlainText);
        }
        ws.set_active("index.html");
        ws.set_active("script.js");
        assert_eq!(surface.0.lock().unwrap().language_of(handle), Some(Language::JavaScript));
        assert!(!ws.preview_available());
    }

    #[tokio::test]
    async fn test_remove_releases_buffer_and_shows_successor() {
        let (mut ws, surface) = open_with(Arc::new(InMemoryStore::new()), WorkspaceOptions::default()).await;
        let index = ws.buffer_of("index.html").unwrap();
        ws.remove("index.html").await.unwrap();
        let s = surface.0.lock().unwrap();
        assert!(!s.is_open(index));
        assert_eq!(s.open_buffers(), 2);
        assert_eq!(ws.active_name(), Some("style.css"));
        assert_eq!(s.shown(), ws.buffer_of("style.css"));
    }

    #[tokio::test]
    async fn test_padded_name_round_trips_through_remove() {
        let (mut ws, surface) = open_with(Arc::new(InMemoryStore::new()), WorkspaceOptions::default()).await;
        ws.create(" a.js", "let a;", true).await.unwrap();
        let handle = ws.buffer_of(" a.js").unwrap();
        ws.set_content("a.js ", "let b;").unwrap();
        assert_eq!(ws.get_content(" a.js").unwrap(), "let b;");
        ws.remove(" a.js").await.unwrap();
        assert!(!ws.vfs().contains("a.js"));
        assert!(!surface.0.lock().unwrap().is_open(handle));
    }

    #[tokio::test]
    async fn test_buffer_edits_flow_into_snapshot() {
        let (mut ws, surface) = open_with(Arc::new(InMemoryStore::new()), WorkspaceOptions::default()).await;
        let handle = ws.buffer_of("script.js").unwrap();
        surface.0.lock().unwrap().set_buffer_text(handle, "edited()");

        // The buffer is authoritative even before the change callback runs.
        assert_eq!(ws.get_content("script.js").unwrap(), "edited()");
        ws.buffer_changed(handle).unwrap();
        assert_eq!(ws.vfs().get_content("script.js").unwrap(), "edited()");

        let snapshot = ws.snapshot_all();
        assert!(snapshot.contains(&SnapshotEntry { name: "script.js".into(), content: "edited()".into() }));
        assert!(ws.buffer_changed(BufferHandle(9999)).is_err());
    }

    #[tokio::test]
    async fn test_set_content_updates_buffer_without_saving() {
        let store = Arc::new(InMemoryStore::new());
        let (mut ws, surface) = open_with(store.clone(), WorkspaceOptions { save_on_write: true, ..Default::default() }).await;
        ws.set_content("style.css", "p {}").unwrap();
        let handle = ws.buffer_of("style.css").unwrap();
        assert_eq!(surface.0.lock().unwrap().buffer_text(handle).as_deref(), Some("p {}"));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_save_on_write_flushes_create_and_remove() {
        let store = Arc::new(InMemoryStore::new());
        let options = WorkspaceOptions { save_on_write: true, ..Default::default() };
        let (mut ws, _surface) = open_with(store.clone(), options).await;
        ws.create("app.js", "x", true).await.unwrap();
        assert_eq!(store.len().await, 4);
        ws.remove("style.css").await.unwrap();
        let names: Vec<String> = store.load_all().await.unwrap().into_iter().map(|r| r.file_name).collect();
        assert_eq!(names, vec!["index.html", "script.js", "app.js"]);
    }

    #[tokio::test]
    async fn test_explicit_save_only_by_default() {
        let store = Arc::new(InMemoryStore::new());
        let (mut ws, _surface) = open_with(store.clone(), WorkspaceOptions::default()).await;
        ws.create("app.js", "x", true).await.unwrap();
        assert_eq!(store.len().await, 0);
        ws.save().await.unwrap();
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn test_duplicate_create_publishes_notice() {
        let (mut ws, _surface) = open_with(Arc::new(InMemoryStore::new()), WorkspaceOptions::default()).await;
        let seen = notices(&mut ws);
        let err = ws.create("index.html", "", true).await.unwrap_err();
        assert!(matches!(err, VfsError::DuplicateName { .. }));
        assert_eq!(ws.vfs().len(), 3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Notice::Rejected { message: "index.html already exists".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_save_failure_notice_once_per_streak() {
        let store = Arc::new(InMemoryStore::new());
        let (mut ws, _surface) = open_with(store.clone(), WorkspaceOptions::default()).await;
        let seen = notices(&mut ws);

        store.set_available(false);
        assert!(ws.save().await.is_err());
        assert!(ws.save().await.is_err());
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(ws.vfs().len(), 3);

        store.set_available(true);
        ws.save().await.unwrap();
        store.set_available(false);
        assert!(ws.save().await.is_err());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_flush_keeps_in_memory_work() {
        let store = Arc::new(InMemoryStore::new());
        let options = WorkspaceOptions { save_on_write: true, ..Default::default() };
        let (mut ws, _surface) = open_with(store.clone(), options).await;
        store.set_available(false);
        ws.create("kept.js", "k", true).await.unwrap();
        assert_eq!(ws.get_content("kept.js").unwrap(), "k");
        assert_eq!(ws.active_name(), Some("kept.js"));
    }

    #[tokio::test]
    async fn test_reset_reseeds_and_saves() {
        let store = Arc::new(InMemoryStore::with_records(&[PersistedRecord::new("a.js", "x")]));
        let (mut ws, surface) = open_with(store.clone(), WorkspaceOptions::default()).await;
        assert_eq!(ws.active_name(), Some("a.js"));
        ws.reset().await.unwrap();
        assert_eq!(ws.active_name(), Some("index.html"));
        assert_eq!(surface.0.lock().unwrap().open_buffers(), 3);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_import_archive_skips_existing() {
        let (mut ws, _surface) = open_with(Arc::new(InMemoryStore::new()), WorkspaceOptions::default()).await;
        let archive = build_archive(&[
            SnapshotEntry { name: "index.html".into(), content: "other".into() },
            SnapshotEntry { name: "extra.json".into(), content: "{}".into() },
        ])
        .unwrap();
        let created = ws.import_archive(&archive).await.unwrap();
        assert_eq!(created, vec!["extra.json"]);
        assert_ne!(ws.get_content("index.html").unwrap(), "other");
        assert!(ws.buffer_of("extra.json").is_some());
    }

    #[tokio::test]
    async fn test_drop_releases_all_buffers() {
        let (ws, surface) = open_with(Arc::new(InMemoryStore::new()), WorkspaceOptions::default()).await;
        drop(ws);
        assert_eq!(surface.0.lock().unwrap().open_buffers(), 0);
    }
}
