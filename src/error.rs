//! Errors surfaced at the content boundary

use std::path::PathBuf;
use thiserror::Error;

/// Failures when looking up a single content entry.
///
/// Corpus-level operations never fail: a missing content directory is an
/// empty corpus, and unreadable files are skipped with a warning.
#[derive(Debug, Error)]
pub enum ContentError {
    /// No readable content file exists for the slug
    #[error("No content entry found for slug '{slug}'")]
    NotFound { slug: String },

    /// The slug cannot name a file inside the content directory
    #[error("Invalid slug '{0}'")]
    InvalidSlug(String),

    /// The file exists but could not be read
    #[error("Failed to read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    /// Whether the caller should treat this as "entry absent"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ContentError::NotFound { .. } | ContentError::Unreadable { .. }
        )
    }
}
