//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Prefix a path with the site root
///
/// # Examples
/// ```ignore
/// url_for(&config, "/works/my-song") // -> "/portfolio/works/my-song"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Absolute URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!("{}{}", config.url.trim_end_matches('/'), url_for(config, path))
}

fn work_route(slug: &str) -> String {
    format!("works/{}", encode_segment(slug))
}

/// Site path of a work's detail page
pub fn work_path(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &work_route(slug))
}

/// Canonical URL of a work's detail page
pub fn work_url(config: &SiteConfig, slug: &str) -> String {
    full_url_for(config, &work_route(slug))
}

/// Percent-encode one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
