//! dxcode-vfs - Virtual file system for an in-browser style code editor
//!
//! An in-memory mapping of file names to text buffers with an active-file
//! pointer, a change notification bus, and a durable record store that the
//! workspace hydrates from at startup and flushes to on save.

pub mod config;
pub mod export;
pub mod store;
pub mod surface;
pub mod vfs;
pub mod workspace;

pub use config::{ConfigError, WorkspaceOptions};
pub use export::{ExportError, PreviewBundle};
pub use store::{DurableStore, InMemoryStore, JsonFileStore, PersistedRecord, StoreError};
pub use surface::{BufferHandle, EditingSurface, HeadlessSurface};
pub use vfs::{language_for, ChangeEvent, ChangeKind, EntryView, Language, Notice, SnapshotEntry, Vfs, VfsError};
pub use workspace::{BootstrapOutcome, Workspace};
