//! Initialize a new worksite

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# Worksite Configuration

# Site
title: Works
url: http://example.com
root: /

# Directory
content_dir: content/works
output_dir: public
extensions: [mdx, md]

# Listing
release_category: Release
default_thumbnail: /images/default-thumbnail.png
date_format: "%Y.%m.%d"

# Markdown
markdown:
  tables: true
  strikethrough: true
  tasklists: true
  footnotes: true
  autolink: true

# Components
components:
  spacer_height: 1.5rem
  video_embed_base: https://www.youtube.com/embed/
"#;

/// Initialize a new site in the given directory.
///
/// Existing files are kept.
pub fn init_site(target_dir: &Path) -> Result<()> {
    let content_dir = target_dir.join("content/works");
    fs::create_dir_all(&content_dir)?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::info!("Keeping existing {:?}", config_path);
    } else {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
    }

    let sample_path = content_dir.join("hello-world.mdx");
    if !sample_path.exists() {
        let today = chrono::Local::now().format("%Y-%m-%d");
        let sample = format!(
            r#"---
title: Hello World
date: {}
category: Release
---

# Hello World

Welcome to your first work. Link to stores with a link list:

<PurchaseLinks links='[{{"url":"https://example.com/buy","label":"Buy"}}]' />

Embed a video:

<YouTube id="dQw4w9WgXcQ" />

Force line breaks<br /><br />like this.


Two blank lines leave extra space before the next paragraph.
"#,
            today
        );
        fs::write(&sample_path, sample)?;
    }

    Ok(())
}
