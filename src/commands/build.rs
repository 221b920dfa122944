//! Build the exported content documents

use anyhow::{Context, Result};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::content::{
    ComponentRenderer, ContentEntry, ContentLoader, ContentTransformer, Frontmatter,
};
use crate::helpers::{list_all, list_works, preload_images};
use crate::Worksite;

/// What a work's detail page receives
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDocument<'a> {
    pub slug: &'a str,
    pub frontmatter: &'a Frontmatter,
    pub raw_body: &'a str,
    /// Transformer output; link list, video and image tokens still in place
    pub rendered_html: &'a str,
    pub images: Vec<String>,
}

impl<'a> WorkDocument<'a> {
    /// None until the entry has been rendered
    pub fn from_entry(entry: &'a ContentEntry) -> Option<Self> {
        let rendered = entry.rendered.as_ref()?;
        Some(Self {
            slug: &entry.slug,
            frontmatter: &entry.frontmatter,
            raw_body: &entry.raw_body,
            rendered_html: &rendered.html,
            images: entry.preload_images(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub entries: usize,
    pub works: usize,
    /// Directives left as text across all entries
    pub failures: usize,
}

/// Render every entry and write the output tree. `jobs` bounds the
/// rendering threads; None uses rayon's default pool.
pub fn run(site: &Worksite, jobs: Option<usize>) -> Result<BuildSummary> {
    let start = Instant::now();

    let entries = ContentLoader::new(site).load_entries();
    tracing::info!("Loaded {} entries", entries.len());

    let transformer = ContentTransformer::new(&site.config);
    let render = |mut entry: ContentEntry| {
        entry.render(&transformer);
        entry
    };
    let entries: Vec<ContentEntry> = match jobs {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("Failed to start render threads")?
            .install(|| entries.into_par_iter().map(render).collect()),
        None => entries.into_par_iter().map(render).collect(),
    };

    let works_dir = site.output_dir.join("works");
    if works_dir.exists() {
        fs::remove_dir_all(&works_dir)
            .with_context(|| format!("Failed to clear {:?}", works_dir))?;
    }
    fs::create_dir_all(&works_dir)
        .with_context(|| format!("Failed to create {:?}", works_dir))?;

    let components = ComponentRenderer::new(&site.config.components);
    entries
        .par_iter()
        .try_for_each(|entry| write_entry(&works_dir, entry, &components))?;

    let index = list_all(&site.config, &entries);
    let works = list_works(&site.config, &entries);
    write_json(&site.output_dir.join("index.json"), &index)?;
    write_json(&site.output_dir.join("works.json"), &works)?;
    write_json(
        &site.output_dir.join("preload.json"),
        &preload_images(&site.config, &entries),
    )?;

    let summary = BuildSummary {
        entries: entries.len(),
        works: works.len(),
        failures: entries
            .iter()
            .filter_map(|e| e.rendered.as_ref())
            .map(|r| r.failures.len())
            .sum(),
    };

    if summary.failures > 0 {
        tracing::warn!("{} directives were left as text", summary.failures);
    }
    tracing::info!(
        "Built {} entries ({} works) in {:.2}s",
        summary.entries,
        summary.works,
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}

fn write_entry(
    works_dir: &Path,
    entry: &ContentEntry,
    components: &ComponentRenderer,
) -> Result<()> {
    let Some(document) = WorkDocument::from_entry(entry) else {
        return Ok(());
    };
    tracing::debug!("Writing {}", entry.slug);

    write_json(&works_dir.join(format!("{}.json", entry.slug)), &document)?;

    let html_path = works_dir.join(format!("{}.html", entry.slug));
    fs::write(&html_path, components.render(document.rendered_html))
        .with_context(|| format!("Failed to write {:?}", html_path))?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

/// Rebuild whenever the content directory or the config file changes.
/// Blocks until the watcher channel closes.
pub fn watch(base_dir: &Path, jobs: Option<usize>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let mut site = Worksite::new(base_dir)?;
    let mut watched: Vec<PathBuf> = Vec::new();

    for (path, mode) in [
        (site.content_dir.clone(), RecursiveMode::Recursive),
        (base_dir.join("_config.yml"), RecursiveMode::NonRecursive),
    ] {
        if path.exists() {
            debouncer.watcher().watch(&path, mode)?;
            tracing::debug!("Watching: {:?}", path);
            watched.push(path);
        }
    }
    if watched.is_empty() {
        anyhow::bail!("Nothing to watch under {:?}", base_dir);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let name = e.path.to_string_lossy();
                        !name.ends_with('~') && !name.contains(".DS_Store")
                    })
                    .collect();
                if relevant.is_empty() {
                    continue;
                }
                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                if relevant.iter().any(|e| e.path.ends_with("_config.yml")) {
                    match Worksite::new(base_dir) {
                        Ok(reloaded) => site = reloaded,
                        Err(e) => {
                            tracing::error!("Keeping previous config: {:#}", e);
                        }
                    }
                }

                if let Err(e) = run(&site, jobs) {
                    tracing::error!("Build failed: {:#}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}
