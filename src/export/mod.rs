//! Export Module
//!
//! Consumers of a workspace snapshot: the preview bundle and the
//! downloadable project archive.

pub mod archive;
pub mod preview;

pub use archive::{build_archive, read_archive, DEFAULT_ARCHIVE_NAME};
pub use preview::PreviewBundle;

use thiserror::Error;

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("the project is empty")]
    EmptyProject,

    #[error("file name too long for archive: {name}")]
    NameTooLong { name: String },

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
