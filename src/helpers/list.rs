//! Listing helpers: index items, the works filter and image preloads

use serde::Serialize;

use super::date::{date_iso, display_date};
use super::url::{work_path, work_url};
use crate::config::SiteConfig;
use crate::content::{ContentEntry, Frontmatter};

/// One row of a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub slug: String,
    pub frontmatter: Frontmatter,
    pub display_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_date: Option<String>,
    pub path: String,
    pub url: String,
}

impl ListItem {
    pub fn from_entry(config: &SiteConfig, entry: &ContentEntry) -> Self {
        Self {
            slug: entry.slug.clone(),
            frontmatter: entry.frontmatter.clone(),
            display_date: display_date(&entry.frontmatter.date, &config.date_format),
            iso_date: date_iso(&entry.frontmatter.date),
            path: work_path(config, &entry.slug),
            url: work_url(config, &entry.slug),
        }
    }
}

/// Listing rows for every entry, order kept
pub fn list_all(config: &SiteConfig, entries: &[ContentEntry]) -> Vec<ListItem> {
    entries
        .iter()
        .map(|e| ListItem::from_entry(config, e))
        .collect()
}

/// Listing rows for the release category only
pub fn list_works(config: &SiteConfig, entries: &[ContentEntry]) -> Vec<ListItem> {
    entries
        .iter()
        .filter(|e| e.frontmatter.is_in_category(&config.release_category))
        .map(|e| ListItem::from_entry(config, e))
        .collect()
}

/// Images a listing page should preload: the default thumbnail, then each
/// distinct entry thumbnail in listing order
pub fn preload_images(config: &SiteConfig, entries: &[ContentEntry]) -> Vec<String> {
    let mut images = vec![config.default_thumbnail.clone()];
    for thumbnail in entries.iter().filter_map(|e| e.frontmatter.thumbnail.as_ref()) {
        if !images.contains(thumbnail) {
            images.push(thumbnail.clone());
        }
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn entry(slug: &str, category: &str, thumbnail: Option<&str>) -> ContentEntry {
        let thumb = thumbnail
            .map(|t| format!("thumbnail: {}\n", t))
            .unwrap_or_default();
        let content = format!(
            "---\ntitle: {}\ndate: 2024-03-09\ncategory: {}\n{}---\nBody",
            slug, category, thumb
        );
        ContentEntry::from_source(slug, Path::new("x.mdx"), &content)
    }

    #[test]
    fn test_list_works_filters_release() {
        let config = SiteConfig::default();
        let entries = vec![
            entry("a", "Release", None),
            entry("b", "Live", None),
            entry("c", "Release", None),
        ];
        let works: Vec<_> = list_works(&config, &entries)
            .into_iter()
            .map(|i| i.slug)
            .collect();
        assert_eq!(works, vec!["a", "c"]);
        assert_eq!(list_all(&config, &entries).len(), 3);
    }

    #[test]
    fn test_list_item_fields() {
        let config = SiteConfig::default();
        let item = ListItem::from_entry(&config, &entry("my-song", "Release", None));
        assert_eq!(item.display_date, "2024.03.09");
        assert_eq!(item.path, "/works/my-song");
        assert_eq!(item.url, "http://example.com/works/my-song");

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["displayDate"], "2024.03.09");
        assert_eq!(json["isoDate"], "2024-03-09T00:00:00");
        assert_eq!(json["frontmatter"]["title"], "my-song");
    }

    #[test]
    fn test_undated_item_has_no_iso_date() {
        let config = SiteConfig::default();
        let undated = ContentEntry::from_source("u", Path::new("u.md"), "no front-matter");
        let item = ListItem::from_entry(&config, &undated);
        assert_eq!(item.iso_date, None);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("isoDate").is_none());
        assert_eq!(json["url"], "http://example.com/works/u");
    }

    #[test]
    fn test_preload_images_distinct_after_default() {
        let config = SiteConfig::default();
        let entries = vec![
            entry("a", "Release", Some("/t/a.png")),
            entry("b", "Release", None),
            entry("c", "Release", Some("/t/a.png")),
            entry("d", "Release", Some("/t/d.png")),
        ];
        assert_eq!(
            preload_images(&config, &entries),
            vec![config.default_thumbnail.clone(), "/t/a.png".into(), "/t/d.png".into()]
        );
    }
}
