//! Component rendering for the deferred placeholder tokens
//!
//! Link lists, videos and images survive the transformer as tokens. This
//! turns them into the HTML fragments the site shows.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::directives::{decode_link_list, decode_video_id, PurchaseLink};
use super::resolver::ImageToken;
use crate::config::ComponentConfig;

lazy_static! {
    /// Any deferred token, optionally wrapped alone in a paragraph
    static ref COMPONENT_TOKEN_RE: Regex = Regex::new(
        r"(?:<p>)?\[(PURCHASE_LINKS_PLACEHOLDER|YOUTUBE_PLACEHOLDER|IMAGE_PLACEHOLDER):([^\]]+)\](?:</p>)?"
    )
    .unwrap();
}

pub struct ComponentRenderer {
    embed_base: String,
}

impl ComponentRenderer {
    pub fn new(config: &ComponentConfig) -> Self {
        Self {
            embed_base: config.video_embed_base.clone(),
        }
    }

    /// Replace every deferred token in `html` with its component
    pub fn render(&self, html: &str) -> String {
        let mut image_index = 0usize;

        COMPONENT_TOKEN_RE
            .replace_all(html, |caps: &Captures| {
                let whole = &caps[0];
                let fragment = match &caps[1] {
                    "PURCHASE_LINKS_PLACEHOLDER" => self.link_list(&caps[2]),
                    "YOUTUBE_PLACEHOLDER" => self.video(&caps[2]),
                    _ => {
                        let fragment = self.image(&ImageToken::parse(&caps[2]), image_index == 0);
                        image_index += 1;
                        fragment
                    }
                };

                // Keep a half-matched paragraph tag balanced
                match (whole.starts_with("<p>"), whole.ends_with("</p>")) {
                    (true, true) | (false, false) => fragment,
                    (true, false) => format!("<p>{}", fragment),
                    (false, true) => format!("{}</p>", fragment),
                }
            })
            .into_owned()
    }

    fn link_list(&self, encoded: &str) -> String {
        let links: Vec<PurchaseLink> = match decode_link_list(encoded) {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Dropping undecodable link list: {}", e);
                return String::new();
            }
        };

        let mut html = String::from(r#"<div class="purchase-links-container">"#);
        for link in &links {
            html.push_str(&format!(
                r#"<a class="purchase-link-button" href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                attr(&link.url),
                text(&link.label)
            ));
        }
        html.push_str("</div>");
        html
    }

    fn video(&self, encoded: &str) -> String {
        let id = match decode_video_id(encoded) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Dropping undecodable video token: {}", e);
                return String::new();
            }
        };
        let src = format!("{}{}", self.embed_base, id);
        format!(
            r#"<div class="video-embed"><iframe src="{}" title="YouTube video player" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe></div>"#,
            attr(&src)
        )
    }

    fn image(&self, image: &ImageToken, first: bool) -> String {
        let loading = if first {
            r#"loading="eager" fetchpriority="high""#
        } else {
            r#"loading="lazy""#
        };
        let caption = if image.caption.is_empty() {
            String::new()
        } else {
            format!("<figcaption>{}</figcaption>", text(&image.caption))
        };
        format!(
            r#"<figure class="work-image"><img src="{}" alt="{}" {}>{}</figure>"#,
            attr(&image.src),
            attr(&image.caption),
            loading,
            caption
        )
    }
}

impl Default for ComponentRenderer {
    fn default() -> Self {
        Self::new(&ComponentConfig::default())
    }
}
