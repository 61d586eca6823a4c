//! Editing Surface Module
//!
//! The capability the workspace uses to drive an external text editor
//! widget. File entries stay pure data; each one is paired with a buffer
//! handle only inside the workspace, and the buffer is released explicitly
//! when the entry goes away.

pub mod headless;

pub use headless::HeadlessSurface;

use crate::vfs::Language;

/// Opaque reference to one editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// Text editor widget operations consumed by the workspace.
pub trait EditingSurface: Send {
    /// Allocate a buffer holding `text` in the given language mode.
    fn open_buffer(&mut self, text: &str, language: Language) -> BufferHandle;

    /// Current text of a buffer, or `None` for an unknown handle.
    fn buffer_text(&self, handle: BufferHandle) -> Option<String>;

    fn set_buffer_text(&mut self, handle: BufferHandle, text: &str);

    fn set_language_mode(&mut self, handle: BufferHandle, language: Language);

    /// Display a buffer in the editor, or nothing.
    fn show(&mut self, handle: Option<BufferHandle>);

    /// Free a buffer. The handle is invalid afterwards.
    fn release_buffer(&mut self, handle: BufferHandle);
}
