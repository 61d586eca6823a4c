//! Durable Store Module
//!
//! Persists the full set of virtual files as a snapshot of
//! `{ fileName, content }` records. Implementations:
//! - InMemoryStore: process-local container with an availability switch
//! - JsonFileStore: one JSON container file on disk, replaced atomically

pub mod types;
pub mod memory_store;
pub mod json_store;

pub use types::*;
pub use memory_store::InMemoryStore;
pub use json_store::JsonFileStore;
