//! Work entry model

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{ContentTransformer, Frontmatter, RenderedDocument};

/// A single work, read from one content file
#[derive(Debug, Clone, Serialize)]
pub struct ContentEntry {
    /// File name without extension
    pub slug: String,

    pub frontmatter: Frontmatter,

    /// Markdown body, front-matter removed
    pub raw_body: String,

    /// Filled on first call to [`ContentEntry::render`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<RenderedDocument>,

    #[serde(skip)]
    pub source: PathBuf,
}

impl ContentEntry {
    /// Build an entry from file contents
    pub fn from_source(slug: impl Into<String>, source: &Path, content: &str) -> Self {
        let (frontmatter, body) = Frontmatter::parse(content);
        Self {
            slug: slug.into(),
            frontmatter,
            raw_body: body.to_string(),
            rendered: None,
            source: source.to_path_buf(),
        }
    }

    /// Render the body once; later calls return the cached document
    pub fn render(&mut self, transformer: &ContentTransformer) -> &RenderedDocument {
        if self.rendered.is_none() {
            tracing::debug!("Rendering entry: {}", self.slug);
            self.rendered = Some(transformer.transform(&self.raw_body));
        }
        self.rendered.get_or_insert_with(RenderedDocument::default)
    }

    /// Parsed date used for ordering; None sorts last
    pub fn date(&self) -> Option<NaiveDateTime> {
        self.frontmatter.parse_date()
    }

    /// Image sources of the rendered body with the thumbnail first.
    /// Empty until the entry is rendered.
    pub fn preload_images(&self) -> Vec<String> {
        let mut images = self
            .rendered
            .as_ref()
            .map(|r| r.images.clone())
            .unwrap_or_default();
        if let Some(thumbnail) = &self.frontmatter.thumbnail {
            if !images.contains(thumbnail) {
                images.insert(0, thumbnail.clone());
            }
        }
        images
    }
}

/// Slug of a content file: its file name without the extension
pub fn slug_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Sort by descending date. Stable, so equal dates keep their order;
/// entries without a usable date go last.
pub fn sort_by_date_desc(entries: &mut [ContentEntry]) {
    entries.sort_by_cached_key(|e| std::cmp::Reverse(e.date()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: &str, date: &str) -> ContentEntry {
        let content = format!("---\ntitle: {}\ndate: {}\n---\nBody", slug, date);
        ContentEntry::from_source(slug, Path::new("x.mdx"), &content)
    }

    #[test]
    fn test_slug_from_path() {
        assert_eq!(
            slug_from_path(Path::new("content/works/my-song.mdx")).as_deref(),
            Some("my-song")
        );
        assert_eq!(
            slug_from_path(Path::new("My-Album.v2.md")).as_deref(),
            Some("My-Album.v2")
        );
    }

    #[test]
    fn test_sort_descending_with_stable_ties() {
        let mut entries = vec![
            entry("old", "2020-01-01"),
            entry("tie-a", "2023-06-01"),
            entry("undated", "soon"),
            entry("new", "2024-02-02"),
            entry("tie-b", "2023-06-01"),
        ];
        sort_by_date_desc(&mut entries);
        let slugs: Vec<_> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "tie-a", "tie-b", "old", "undated"]);
    }

    #[test]
    fn test_render_is_lazy_and_cached() {
        let transformer = ContentTransformer::default();
        let mut e = entry("song", "2024-01-01");
        assert!(e.rendered.is_none());

        let html = e.render(&transformer).html.clone();
        assert_eq!(html, "<p>Body</p>\n");
        e.raw_body = "changed".to_string();
        assert_eq!(e.render(&transformer).html, html);
    }

    #[test]
    fn test_preload_images_puts_thumbnail_first() {
        let transformer = ContentTransformer::default();
        let content = "---\nthumbnail: /thumb.png\n---\n![a](/a.png)\n\n![t](/thumb.png)";
        let mut e = ContentEntry::from_source("s", Path::new("s.mdx"), content);
        e.render(&transformer);
        assert_eq!(e.preload_images(), vec!["/a.png", "/thumb.png"]);

        let content = "---\nthumbnail: /thumb.png\n---\n![a](/a.png)";
        let mut e = ContentEntry::from_source("s", Path::new("s.mdx"), content);
        e.render(&transformer);
        assert_eq!(e.preload_images(), vec!["/thumb.png", "/a.png"]);
    }
}
