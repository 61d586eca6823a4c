//! Virtual File System Module
//!
//! In-memory mapping of file names to text buffers, the active-file
//! pointer, and the change notification bus that presentation layers
//! subscribe to.

pub mod types;
pub mod language;
pub mod events;
pub mod virtual_fs;

pub use types::*;
pub use language::{extension, language_for, Language};
pub use events::{ChangeEvent, ChangeKind, Notice, NotificationBus, Observer, SubscriptionId};
pub use virtual_fs::Vfs;
