//! worksite: content pipeline for a portfolio of creative works
//!
//! Work files (Markdown with front-matter and a few custom directives) are
//! turned into render-ready HTML plus the metadata a site needs to list and
//! display them.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;

use anyhow::Result;
use std::path::Path;

pub use error::ContentError;

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Worksite {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Directory holding the work files
    pub content_dir: std::path::PathBuf,
    /// Build output directory
    pub output_dir: std::path::PathBuf,
}

impl Worksite {
    /// Open the site in `base_dir`, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let output_dir = base_dir.join(&config.output_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            output_dir,
        })
    }

    /// Build the output tree
    pub fn build(&self) -> Result<commands::build::BuildSummary> {
        commands::build::run(self, None)
    }

    /// Clean the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Scaffold a new work
    pub fn new_work(&self, title: &str) -> Result<std::path::PathBuf> {
        commands::new::create_work(self, title, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_new_without_config() {
        let tmp = TempDir::new().unwrap();
        let site = Worksite::new(tmp.path()).unwrap();
        assert_eq!(site.content_dir, tmp.path().join("content/works"));
        assert_eq!(site.output_dir, tmp.path().join("public"));
    }

    #[test]
    fn test_new_with_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("_config.yml"),
            "content_dir: works\noutput_dir: dist\n",
        )
        .unwrap();
        let site = Worksite::new(tmp.path()).unwrap();
        assert_eq!(site.content_dir, tmp.path().join("works"));
        assert_eq!(site.output_dir, tmp.path().join("dist"));
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("_config.yml"), "extensions: 3\n").unwrap();
        assert!(Worksite::new(tmp.path()).is_err());
    }
}
