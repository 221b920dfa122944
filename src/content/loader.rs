//! Content loader - discovers work files in the content directory

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::entry::{slug_from_path, sort_by_date_desc};
use super::ContentEntry;
use crate::error::ContentError;
use crate::Worksite;

/// Loads work entries from the content directory
pub struct ContentLoader<'a> {
    site: &'a Worksite,
}

impl<'a> ContentLoader<'a> {
    pub fn new(site: &'a Worksite) -> Self {
        Self { site }
    }

    /// Load every entry, newest first.
    ///
    /// A missing directory is an empty corpus. Files that cannot be read
    /// are skipped with a warning.
    pub fn load_entries(&self) -> Vec<ContentEntry> {
        let mut entries = Vec::new();
        for (slug, path) in self.discover() {
            match fs::read_to_string(&path) {
                Ok(content) => entries.push(ContentEntry::from_source(slug, &path, &content)),
                Err(e) => tracing::warn!("Failed to read {:?}: {}", path, e),
            }
        }

        sort_by_date_desc(&mut entries);
        tracing::debug!("Loaded {} entries from {:?}", entries.len(), self.site.content_dir);
        entries
    }

    /// Load a single entry by slug
    pub fn load_entry(&self, slug: &str) -> Result<ContentEntry, ContentError> {
        validate_slug(slug)?;

        for ext in &self.site.config.extensions {
            let path = self.site.content_dir.join(format!("{}.{}", slug, ext));
            if !path.is_file() {
                continue;
            }
            let content = fs::read_to_string(&path)
                .map_err(|source| ContentError::Unreadable { path: path.clone(), source })?;
            return Ok(ContentEntry::from_source(slug, &path, &content));
        }

        Err(ContentError::NotFound {
            slug: slug.to_string(),
        })
    }

    /// Slugs of every content file, in file name order
    pub fn slugs(&self) -> Vec<String> {
        self.discover().into_iter().map(|(slug, _)| slug).collect()
    }

    /// Content files directly inside the content directory, one per slug.
    /// When a slug exists with several extensions, the first configured
    /// extension wins.
    fn discover(&self) -> Vec<(String, PathBuf)> {
        let dir = &self.site.content_dir;
        if !dir.is_dir() {
            tracing::debug!("Content directory {:?} does not exist", dir);
            return Vec::new();
        }

        let mut files: Vec<(String, PathBuf)> = Vec::new();
        let mut seen = HashSet::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !self.is_content_file(path) {
                continue;
            }
            let Some(slug) = slug_from_path(path) else {
                continue;
            };
            if !seen.insert(slug.clone()) {
                continue;
            }
            files.push((slug, self.preferred_path(dir, path)));
        }

        files
    }

    fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.site.config.is_content_extension(e))
            .unwrap_or(false)
    }

    /// The file a slug resolves to, following extension priority
    fn preferred_path(&self, dir: &Path, found: &Path) -> PathBuf {
        let Some(stem) = found.file_stem().and_then(|s| s.to_str()) else {
            return found.to_path_buf();
        };
        self.site
            .config
            .extensions
            .iter()
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .find(|p| p.is_file())
            .unwrap_or_else(|| found.to_path_buf())
    }
}

/// A slug must name a file directly inside the content directory
fn validate_slug(slug: &str) -> Result<(), ContentError> {
    if slug.is_empty()
        || slug.contains('/')
        || slug.contains('\\')
        || slug.contains("..")
        || slug.starts_with('.')
    {
        return Err(ContentError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}
