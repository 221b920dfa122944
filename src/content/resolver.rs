//! Placeholder resolution after Markdown conversion
//!
//! Internal placeholders (line breaks, paragraph breaks) are expanded here.
//! Link lists, videos and images are left as tokens for the component layer.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::directives::{
    truncate, DirectiveFailure, DirectiveKind, Placeholder, FAILURE_SOURCE_CHARS, LINK_LIST_RE,
};
use crate::config::ComponentConfig;

lazy_static! {
    static ref LINE_BREAK_TOKEN_RE: Regex =
        Regex::new(r"\[BR_PLACEHOLDER:\d+:(\d+)\]").unwrap();
    /// The marker alone in its paragraph, or bare
    static ref PARAGRAPH_BREAK_RE: Regex =
        Regex::new(r"<p>\[DOUBLE_LINE_BREAK\]</p>\n?|\[DOUBLE_LINE_BREAK\]").unwrap();
    /// Link list directives the converter escaped
    static ref ESCAPED_LINK_LIST_RE: Regex = Regex::new(
        r#"(?s)&lt;PurchaseLinks\s+links=(?:'(.*?)'|&#39;(.*?)&#39;|&quot;(.*?)&quot;|"(.*?)")\s*/&gt;"#
    )
    .unwrap();
    static ref IMG_TAG_RE: Regex = Regex::new(r"(?i)<img(\s[^>]*?)?\s*/?>").unwrap();
    static ref SRC_ATTR_RE: Regex =
        Regex::new(r#"(?i)(?:^|\s)src\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
    static ref ALT_ATTR_RE: Regex =
        Regex::new(r#"(?i)(?:^|\s)alt\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
    static ref IMAGE_TOKEN_RE: Regex = Regex::new(r"\[IMAGE_PLACEHOLDER:([^\]]+)\]").unwrap();
}

/// Resolves internal placeholders in converted HTML
pub struct PlaceholderResolver {
    spacer: String,
}

impl PlaceholderResolver {
    pub fn new(config: &ComponentConfig) -> Self {
        Self {
            spacer: format!(
                r#"<div class="paragraph-spacer" style="height: {}; margin: 0; padding: 0;"></div>"#,
                html_escape::encode_double_quoted_attribute(&config.spacer_height)
            ),
        }
    }

    /// Run every resolution step. Running it again on its own output
    /// changes nothing.
    pub fn resolve(&self, html: &str, failures: &mut Vec<DirectiveFailure>) -> String {
        let html = expand_line_breaks(html);
        let html = self.expand_paragraph_breaks(&html);
        let html = reencode_link_lists(&html, failures);
        rewrite_images(&html, failures)
    }

    fn expand_paragraph_breaks(&self, html: &str) -> String {
        PARAGRAPH_BREAK_RE
            .replace_all(html, self.spacer.as_str())
            .into_owned()
    }
}

fn expand_line_breaks(html: &str) -> String {
    LINE_BREAK_TOKEN_RE
        .replace_all(html, |caps: &Captures| match caps[1].parse::<usize>() {
            Ok(count) => "<br />".repeat(count),
            Err(e) => {
                tracing::warn!("Dropping line break token {}: {}", &caps[0], e);
                String::new()
            }
        })
        .into_owned()
}

/// Turn link list directives that reached the HTML, raw or entity-escaped,
/// into tokens. Invalid payloads stay as they are.
fn reencode_link_lists(html: &str, failures: &mut Vec<DirectiveFailure>) -> String {
    let encode = |caps: &Captures, failures: &mut Vec<DirectiveFailure>| {
        let whole = &caps[0];
        let payload = (1..caps.len())
            .find_map(|i| caps.get(i))
            .map_or("", |m| m.as_str());
        let json = html_escape::decode_html_entities(payload);
        match Placeholder::link_list(&json) {
            Ok(token) => token.to_string(),
            Err(reason) => {
                // Already reported when it went through preprocessing
                let seen = truncate(&html_escape::decode_html_entities(whole), FAILURE_SOURCE_CHARS);
                if !failures
                    .iter()
                    .any(|f| f.kind == DirectiveKind::LinkList && f.source == seen)
                {
                    failures.push(DirectiveFailure::new(DirectiveKind::LinkList, whole, reason));
                }
                whole.to_string()
            }
        }
    };

    let html = LINK_LIST_RE
        .replace_all(html, |caps: &Captures| encode(caps, failures))
        .into_owned();
    ESCAPED_LINK_LIST_RE
        .replace_all(&html, |caps: &Captures| encode(caps, failures))
        .into_owned()
}

/// Rewrite `<img>` elements into image tokens
fn rewrite_images(html: &str, failures: &mut Vec<DirectiveFailure>) -> String {
    IMG_TAG_RE
        .replace_all(html, |caps: &Captures| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let src = attr_value(&SRC_ATTR_RE, attrs).unwrap_or("");
            if src.is_empty() {
                failures.push(DirectiveFailure::new(
                    DirectiveKind::Image,
                    &caps[0],
                    "image without src",
                ));
                return caps[0].to_string();
            }
            let caption = attr_value(&ALT_ATTR_RE, attrs).unwrap_or("");

            Placeholder::Image {
                src: escape_token_src(src),
                caption: escape_token_caption(caption),
            }
            .to_string()
        })
        .into_owned()
}

fn attr_value<'a>(re: &Regex, attrs: &'a str) -> Option<&'a str> {
    let caps = re.captures(attrs)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Sources may contain colons; only `]` would end the token early
fn escape_token_src(src: &str) -> String {
    src.replace(']', "%5D")
}

/// Captions follow the last colon, so they can contain neither `:` nor `]`
fn escape_token_caption(caption: &str) -> String {
    caption.replace(':', "&#58;").replace(']', "&#93;")
}

/// An image token split into its decoded source and caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageToken {
    pub src: String,
    pub caption: String,
}

impl ImageToken {
    /// Parse the inside of `[IMAGE_PLACEHOLDER:...]`
    pub fn parse(content: &str) -> Self {
        let (src, caption) = content.rsplit_once(':').unwrap_or((content, ""));
        Self {
            src: html_escape::decode_html_entities(src).into_owned(),
            caption: html_escape::decode_html_entities(caption).into_owned(),
        }
    }
}

/// Distinct image sources of the image tokens in `html`, in order
pub fn extract_image_sources(html: &str) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for caps in IMAGE_TOKEN_RE.captures_iter(html) {
        let token = ImageToken::parse(&caps[1]);
        if !token.src.is_empty() && !sources.contains(&token.src) {
            sources.push(token.src);
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::directives::decode_link_list;

    fn resolver() -> PlaceholderResolver {
        PlaceholderResolver::new(&ComponentConfig::default())
    }

    fn resolve(html: &str) -> String {
        resolver().resolve(html, &mut Vec::new())
    }

    #[test]
    fn test_line_breaks_expand_to_count() {
        let html = resolve("<p>a[BR_PLACEHOLDER:0:3]b[BR_PLACEHOLDER:1:1]c</p>");
        assert_eq!(html, "<p>a<br /><br /><br />b<br />c</p>");
    }

    #[test]
    fn test_paragraph_break_becomes_spacer() {
        let html = resolve("<p>One</p>\n<p>[DOUBLE_LINE_BREAK]</p>\n<p>Two</p>\n");
        assert_eq!(html.matches("paragraph-spacer").count(), 1);
        assert!(html.contains("height: 1.5rem"));
        assert!(!html.contains("<p></p>"));
        assert!(!html.contains("DOUBLE_LINE_BREAK"));
    }

    #[test]
    fn test_escaped_link_list_is_reencoded() {
        let html = resolve(
            "<pre><code>&lt;PurchaseLinks links='[{&quot;url&quot;:&quot;https://x&quot;,&quot;label&quot;:&quot;Buy&quot;}]' /&gt;</code></pre>",
        );
        let start = html.find("[PURCHASE_LINKS_PLACEHOLDER:").unwrap();
        let rest = &html[start + "[PURCHASE_LINKS_PLACEHOLDER:".len()..];
        let encoded = &rest[..rest.find(']').unwrap()];
        let links = decode_link_list(encoded).unwrap();
        assert_eq!(links[0].url, "https://x");
        assert_eq!(links[0].label, "Buy");
        assert!(!html.contains("&lt;PurchaseLinks"));
    }

    #[test]
    fn test_invalid_escaped_link_list_stays() {
        let input = "<p>&lt;PurchaseLinks links=&quot;nope&quot; /&gt;</p>";
        let mut failures = Vec::new();
        let html = resolver().resolve(input, &mut failures);
        assert_eq!(html, input);
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn test_images_any_attribute_order() {
        let html = resolve(
            r#"<p><img src="https://x/a.png" alt="First" /></p><p><img alt="Second" src="/b.jpg"></p><p><img src='/c.gif'></p>"#,
        );
        assert_eq!(
            html,
            "<p>[IMAGE_PLACEHOLDER:https://x/a.png:First]</p><p>[IMAGE_PLACEHOLDER:/b.jpg:Second]</p><p>[IMAGE_PLACEHOLDER:/c.gif:]</p>"
        );
    }

    #[test]
    fn test_image_without_src_is_left() {
        let input = r#"<img alt="nothing">"#;
        let mut failures = Vec::new();
        assert_eq!(resolver().resolve(input, &mut failures), input);
        assert_eq!(failures[0].kind, DirectiveKind::Image);
    }

    #[test]
    fn test_data_src_is_not_src() {
        let html = resolve(r#"<img data-src="/lazy.png" src="/real.png">"#);
        assert_eq!(html, "[IMAGE_PLACEHOLDER:/real.png:]");
    }

    #[test]
    fn test_caption_with_colon_round_trips() {
        let html = resolve(r#"<img src="https://x/a.png" alt="Live: Tokyo [2024]">"#);
        let token = IMAGE_TOKEN_RE.captures(&html).unwrap();
        let image = ImageToken::parse(&token[1]);
        assert_eq!(image.src, "https://x/a.png");
        assert_eq!(image.caption, "Live: Tokyo [2024]");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let input = "<p>a[BR_PLACEHOLDER:0:2]b</p>\n<p>[DOUBLE_LINE_BREAK]</p>\n<p><img src=\"/x.png\" alt=\"x\"></p>";
        let once = resolve(input);
        let twice = resolve(&once);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("<br />").count(), 2);
    }

    #[test]
    fn test_extract_image_sources() {
        let html = "[IMAGE_PLACEHOLDER:https://x/a.png:A] [IMAGE_PLACEHOLDER:/b.png:] [IMAGE_PLACEHOLDER:https://x/a.png:again] [IMAGE_PLACEHOLDER:/q?a=1&amp;b=2:]";
        assert_eq!(
            extract_image_sources(html),
            vec!["https://x/a.png", "/b.png", "/q?a=1&b=2"]
        );
    }
}
