//! Workspace Module
//!
//! The application shell that owns a VFS for one editing session: runs the
//! one-shot bootstrap, binds entries to editor buffers, and flushes to the
//! durable store on save (and after each create/remove when configured).

pub mod defaults;
pub mod bootstrap;
pub mod workspace;

pub use bootstrap::{bootstrap, seed_defaults, BootstrapOutcome, SeedReason};
pub use workspace::Workspace;
