//! Create a new work file

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::Worksite;

/// Scaffold a work named after its title (or an explicit slug).
/// Returns the created path.
pub fn create_work(
    site: &Worksite,
    title: &str,
    category: Option<&str>,
    slug: Option<&str>,
) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        bail!("Cannot derive a file name from title {:?}", title);
    }

    let ext = site
        .config
        .extensions
        .first()
        .map(String::as_str)
        .unwrap_or("mdx");
    let category = category.unwrap_or(&site.config.release_category);

    fs::create_dir_all(&site.content_dir)?;
    let file_path = site.content_dir.join(format!("{}.{}", slug, ext));
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let content = format!(
        "---\ntitle: {}\ndate: {}\ncategory: {}\nthumbnail:\n---\n",
        yaml_string(title),
        now.format("%Y-%m-%d"),
        yaml_string(category)
    );
    fs::write(&file_path, content)?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Quote a scalar when plain YAML would misread it
fn yaml_string(s: &str) -> String {
    match serde_yaml::to_string(s) {
        Ok(yaml) => yaml.trim_end().to_string(),
        Err(_) => format!("{:?}", s),
    }
}
