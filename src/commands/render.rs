//! Render a single work

use anyhow::{Context, Result};

use crate::content::{ComponentRenderer, ContentLoader, ContentTransformer};
use crate::Worksite;

/// HTML for one work. `raw` stops after the transformer, leaving the
/// component tokens in place.
pub fn render_work(site: &Worksite, slug: &str, raw: bool) -> Result<String> {
    let mut entry = ContentLoader::new(site)
        .load_entry(slug)
        .with_context(|| format!("Cannot render '{}'", slug))?;

    let transformer = ContentTransformer::new(&site.config);
    let html = entry.render(&transformer).html.clone();
    if raw {
        return Ok(html);
    }

    Ok(ComponentRenderer::new(&site.config.components).render(&html))
}

pub fn run(site: &Worksite, slug: &str, raw: bool) -> Result<()> {
    print!("{}", render_work(site, slug, raw)?);
    Ok(())
}
