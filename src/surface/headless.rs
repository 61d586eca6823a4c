//! Headless Editing Surface
//!
//! Keeps buffers in memory with no rendering. Used by the command-line shell
//! and by tests to observe what the workspace pushes to the editor.

use std::collections::HashMap;

use super::{BufferHandle, EditingSurface};
use crate::vfs::Language;

#[derive(Debug, Clone)]
struct HeadlessBuffer {
    text: String,
    language: Language,
}

/// In-memory editing surface.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    buffers: HashMap<BufferHandle, HeadlessBuffer>,
    shown: Option<BufferHandle>,
    next_handle: u64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer currently displayed.
    pub fn shown(&self) -> Option<BufferHandle> {
        self.shown
    }

    pub fn language_of(&self, handle: BufferHandle) -> Option<Language> {
        self.buffers.get(&handle).map(|b| b.language)
    }

    /// Number of live buffers.
    pub fn open_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_open(&self, handle: BufferHandle) -> bool {
        self.buffers.contains_key(&handle)
    }
}

impl EditingSurface for HeadlessSurface {
    fn open_buffer(&mut self, text: &str, language: Language) -> BufferHandle {
        let handle = BufferHandle(self.next_handle);
        self.next_handle += 1;
        self.buffers.insert(handle, HeadlessBuffer { text: text.to_string(), language });
        handle
    }

    fn buffer_text(&self, handle: BufferHandle) -> Option<String> {
        self.buffers.get(&handle).map(|b| b.text.clone())
    }

    fn set_buffer_text(&mut self, handle: BufferHandle, text: &str) {
        if let Some(buffer) = self.buffers.get_mut(&handle) {
            buffer.text = text.to_string();
        }
    }

    fn set_language_mode(&mut self, handle: BufferHandle, language: Language) {
        if let Some(buffer) = self.buffers.get_mut(&handle) {
            buffer.language = language;
        }
    }

    fn show(&mut self, handle: Option<BufferHandle>) {
        self.shown = handle.filter(|h| self.buffers.contains_key(h));
    }

    fn release_buffer(&mut self, handle: BufferHandle) {
        self.buffers.remove(&handle);
        if self.shown == Some(handle) {
            self.shown = None;
        }
    }
}
