use serde::{Deserialize, Serialize};

use crate::vfs::SnapshotEntry;
use crate::workspace::defaults::{INDEX_HTML, SCRIPT_JS, STYLE_CSS};

/// Markup shown when the project has no `index.html`.
pub const MISSING_INDEX_HTML: &str = "<h1>index.html not found</h1>";

/// Read-only code bundle handed to the preview window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBundle {
    pub html: String,
    pub css: String,
    pub js: String,
    pub file_names: Vec<String>,
}

impl PreviewBundle {
    pub fn from_snapshot(snapshot: &[SnapshotEntry]) -> Self {
        let content_of = |name: &str| {
            snapshot
                .iter()
                .find(|e| e.name == name)
                .map(|e| e.content.clone())
                .filter(|c| !c.is_empty())
        };
        Self {
            html: content_of(INDEX_HTML).unwrap_or_else(|| MISSING_INDEX_HTML.to_string()),
            css: content_of(STYLE_CSS).unwrap_or_default(),
            js: content_of(SCRIPT_JS).unwrap_or_default(),
            file_names: snapshot.iter().map(|e| e.name.clone()).collect(),
        }
    }
}
