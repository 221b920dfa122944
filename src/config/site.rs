//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub output_dir: String,
    /// Content file extensions, in lookup priority order
    pub extensions: Vec<String>,

    // Listing
    pub release_category: String,
    pub default_thumbnail: String,
    /// chrono format string used for display dates
    pub date_format: String,

    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub components: ComponentConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Works".to_string(),
            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "content/works".to_string(),
            output_dir: "public".to_string(),
            extensions: vec!["mdx".to_string(), "md".to_string()],

            release_category: "Release".to_string(),
            default_thumbnail: "/images/default-thumbnail.png".to_string(),
            date_format: "%Y.%m.%d".to_string(),

            markdown: MarkdownConfig::default(),
            components: ComponentConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Whether a file extension names a content file
    pub fn is_content_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Markdown extension switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub footnotes: bool,
    /// Turn bare `http(s)://` and `www.` URLs into links
    pub autolink: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            footnotes: true,
            autolink: true,
        }
    }
}

/// Settings for the HTML fragments that replace placeholders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    /// CSS height of the paragraph-break spacer
    pub spacer_height: String,
    pub video_embed_base: String,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            spacer_height: "1.5rem".to_string(),
            video_embed_base: "https://www.youtube.com/embed/".to_string(),
        }
    }
}
