//! List site content

use anyhow::Result;

use crate::content::ContentLoader;
use crate::helpers::{list_all, list_works, ListItem};
use crate::Worksite;

/// Listing rows for the requested type
pub fn items(site: &Worksite, content_type: &str) -> Result<Vec<ListItem>> {
    let entries = ContentLoader::new(site).load_entries();

    match content_type {
        "all" | "entries" => Ok(list_all(&site.config, &entries)),
        "works" | "release" => Ok(list_works(&site.config, &entries)),
        _ => anyhow::bail!("Unknown type: {}. Available: all, works", content_type),
    }
}

/// Print site content by type
pub fn run(site: &Worksite, content_type: &str) -> Result<()> {
    let items = items(site, content_type)?;

    println!("{} ({} entries):", site.config.title, items.len());
    for item in items {
        println!(
            "  {} - {} [{}] {}",
            item.display_date, item.frontmatter.title, item.frontmatter.category, item.url
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_items_by_type() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("content/works");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.mdx"), "---\ndate: 2024-01-01\ncategory: Release\n---\n").unwrap();
        fs::write(dir.join("b.mdx"), "---\ndate: 2024-02-01\ncategory: Live\n---\n").unwrap();
        let site = Worksite::new(tmp.path()).unwrap();

        let all: Vec<_> = items(&site, "all").unwrap().into_iter().map(|i| i.slug).collect();
        assert_eq!(all, vec!["b", "a"]);
        let works: Vec<_> = items(&site, "works").unwrap().into_iter().map(|i| i.slug).collect();
        assert_eq!(works, vec!["a"]);
        assert!(items(&site, "tags").is_err());
    }
}
