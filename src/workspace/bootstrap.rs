//! Bootstrap Policy
//!
//! Decides, once per session, whether the VFS is hydrated from the durable
//! store or seeded with the starter project.

use tracing::{debug, warn};

use super::defaults::DEFAULT_FILES;
use crate::store::{DurableStore, StoreError};
use crate::vfs::Vfs;

/// Why the starter project was seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedReason {
    /// The store opened but held no usable records.
    EmptyStore,
    /// The store could not be opened or read.
    StoreFailed(StoreError),
}

/// Result of bootstrapping a VFS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Restored { files: usize },
    Seeded { reason: SeedReason },
}

impl BootstrapOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, BootstrapOutcome::Restored { .. })
    }
}

/// Populate an empty `vfs` from `store`, or with the defaults.
///
/// Records are created in the order the store returns them, none of them
/// activated, and then the first one becomes active. A load failure is not
/// reported to the user; it only selects the defaults.
pub async fn bootstrap(vfs: &mut Vfs, store: &dyn DurableStore) -> BootstrapOutcome {
    let loaded = match store.open().await {
        Ok(()) => store.load_all().await,
        Err(e) => Err(e),
    };

    let records = match loaded {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "durable store unavailable, seeding defaults");
            seed_defaults(vfs);
            return BootstrapOutcome::Seeded { reason: SeedReason::StoreFailed(e) };
        }
    };

    let mut first: Option<String> = None;
    for record in records {
        match vfs.create(&record.file_name, &record.content, false) {
            Ok(name) => {
                first.get_or_insert(name);
            }
            Err(e) => warn!(error = %e, "skipping persisted record"),
        }
    }

    match first {
        Some(name) => {
            vfs.set_active(&name);
            debug!(files = vfs.len(), active = %name, "restored project from store");
            BootstrapOutcome::Restored { files: vfs.len() }
        }
        None => {
            debug!("store is empty, seeding defaults");
            seed_defaults(vfs);
            BootstrapOutcome::Seeded { reason: SeedReason::EmptyStore }
        }
    }
}

/// Create the starter files and activate the first.
pub fn seed_defaults(vfs: &mut Vfs) {
    for (name, content) in DEFAULT_FILES {
        if let Err(e) = vfs.create(name, content, false) {
            warn!(error = %e, "default file not created");
        }
    }
    vfs.set_active(DEFAULT_FILES[0].0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, PersistedRecord};

    fn names(vfs: &Vfs) -> Vec<String> {
        vfs.names().map(str::to_string).collect()
    }

    #[tokio::test]
    async fn test_empty_store_seeds_defaults() {
        let store = InMemoryStore::new();
        let mut vfs = Vfs::new();
        let outcome = bootstrap(&mut vfs, &store).await;
        assert_eq!(outcome, BootstrapOutcome::Seeded { reason: SeedReason::EmptyStore });
        assert_eq!(names(&vfs), vec!["index.html", "style.css", "script.js"]);
        assert_eq!(vfs.active_name(), Some("index.html"));
    }

    #[tokio::test]
    async fn test_unavailable_store_seeds_defaults() {
        let store = InMemoryStore::unavailable();
        let mut vfs = Vfs::new();
        let outcome = bootstrap(&mut vfs, &store).await;
        assert!(matches!(
            outcome,
            BootstrapOutcome::Seeded { reason: SeedReason::StoreFailed(StoreError::Unavailable { .. }) }
        ));
        assert_eq!(vfs.len(), 3);
        assert_eq!(vfs.active_name(), Some("index.html"));
    }

    #[tokio::test]
    async fn test_persisted_records_are_restored() {
        let store = InMemoryStore::with_records(&[
            PersistedRecord::new("a.js", "x"),
            PersistedRecord::new("b.css", "y"),
        ]);
        let mut vfs = Vfs::new();
        let outcome = bootstrap(&mut vfs, &store).await;
        assert_eq!(outcome, BootstrapOutcome::Restored { files: 2 });
        assert_eq!(names(&vfs), vec!["a.js", "b.css"]);
        assert_eq!(vfs.active_name(), Some("a.js"));
        assert_eq!(vfs.get_content("a.js").unwrap(), "x");
        assert_eq!(vfs.get_content("b.css").unwrap(), "y");
        assert!(!vfs.contains("index.html"));
    }

    #[tokio::test]
    async fn test_unusable_records_fall_back_to_defaults() {
        let store = InMemoryStore::with_records(&[PersistedRecord::new("   ", "x")]);
        let mut vfs = Vfs::new();
        let outcome = bootstrap(&mut vfs, &store).await;
        assert_eq!(outcome, BootstrapOutcome::Seeded { reason: SeedReason::EmptyStore });
        assert_eq!(vfs.active_name(), Some("index.html"));
    }

    #[test]
    fn test_default_contents() {
        let mut vfs = Vfs::new();
        seed_defaults(&mut vfs);
        assert!(vfs.get_content("index.html").unwrap().contains("<h1>Hello DXCode</h1>"));
        assert!(vfs.get_content("style.css").unwrap().contains("#2e2e2e"));
        assert_eq!(vfs.get_content("script.js").unwrap(), "console.log(\"DXCode is ready!\");");
    }
}
