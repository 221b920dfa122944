//! The content transformer: directives → Markdown → resolved HTML

use serde::Serialize;

use super::directives::{self, DirectiveFailure};
use super::markdown::MarkdownRenderer;
use super::resolver::{extract_image_sources, PlaceholderResolver};
use crate::config::SiteConfig;

/// Transformer output, ready for the component layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    /// HTML where only link list, video and image tokens remain
    pub html: String,
    /// Distinct image sources in document order
    pub images: Vec<String>,
    /// Directives that were left as literal text
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<DirectiveFailure>,
}

/// Converts a document body into a [`RenderedDocument`].
///
/// Holds no per-document state, so one transformer can serve any number of
/// documents, from any number of threads.
pub struct ContentTransformer {
    markdown: MarkdownRenderer,
    resolver: PlaceholderResolver,
}

impl ContentTransformer {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            markdown: MarkdownRenderer::with_config(&config.markdown),
            resolver: PlaceholderResolver::new(&config.components),
        }
    }

    /// Transform a body (front-matter already removed)
    pub fn transform(&self, body: &str) -> RenderedDocument {
        let body = normalize_newlines(body);

        let preprocessed = directives::preprocess(&body);
        let mut failures = preprocessed.failures;

        let html = self.markdown.render(&preprocessed.text);
        let html = self.resolver.resolve(&html, &mut failures);
        let images = extract_image_sources(&html);

        RenderedDocument {
            html,
            images,
            failures,
        }
    }
}

impl Default for ContentTransformer {
    fn default() -> Self {
        Self::new(&SiteConfig::default())
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(body: &str) -> RenderedDocument {
        ContentTransformer::default().transform(body)
    }

    #[test]
    fn test_break_count_preserved() {
        for n in 1..=4 {
            let body = format!("first{}second", "<br />".repeat(n));
            let doc = transform(&body);
            let expected = format!("first{}second", "<br />".repeat(n));
            assert!(doc.html.contains(&expected), "n={}: {}", n, doc.html);
        }
    }

    #[test]
    fn test_two_blank_lines_give_one_spacer() {
        let doc = transform("First block.\n\n\nSecond block.");
        assert_eq!(doc.html.matches("paragraph-spacer").count(), 1);
        assert_eq!(doc.html.matches("<p>").count(), 2);
        assert!(doc.html.contains("<p>First block.</p>"));
        assert!(doc.html.contains("<p>Second block.</p>"));
        assert!(!doc.html.contains("<p></p>"));
    }

    #[test]
    fn test_one_blank_line_has_no_spacer() {
        let doc = transform("First.\n\nSecond.");
        assert!(!doc.html.contains("paragraph-spacer"));
    }

    #[test]
    fn test_markdown_images_become_tokens() {
        let doc = transform("![Cover art](https://x/cover.png)\n\n![](/photos/live.jpg \"Live\")");
        assert!(doc.html.contains("[IMAGE_PLACEHOLDER:https://x/cover.png:Cover art]"));
        assert!(doc.html.contains("[IMAGE_PLACEHOLDER:/photos/live.jpg:]"));
        assert!(!doc.html.contains("<img"));
        assert_eq!(doc.images, vec!["https://x/cover.png", "/photos/live.jpg"]);
    }

    #[test]
    fn test_raw_html_images_become_tokens() {
        let doc = transform("<img alt=\"Raw\" src=\"/raw.png\">");
        assert!(doc.html.contains("[IMAGE_PLACEHOLDER:/raw.png:Raw]"));
    }

    #[test]
    fn test_crlf_body() {
        let doc = transform("One\r\n\r\n\r\nTwo<br />\r\nThree");
        assert_eq!(doc.html.matches("paragraph-spacer").count(), 1);
        assert!(doc.html.contains("Two<br />"));
    }

    #[test]
    fn test_bad_directive_does_not_blank_document() {
        let doc = transform("# Still here\n\n<PurchaseLinks links='not json' />\n\nText after.");
        assert!(doc.html.contains("<h1>Still here</h1>"));
        assert!(doc.html.contains("Text after."));
        assert!(doc.html.contains("<PurchaseLinks links='not json' />"));
        assert_eq!(doc.failures.len(), 1);
    }

    #[test]
    fn test_url_before_line_break() {
        let doc = transform("Shop: https://shop.example/a<br />Next line");
        assert!(doc.html.contains(
            r#"<a href="https://shop.example/a">https://shop.example/a</a><br />Next line"#
        ));
        assert!(!doc.html.contains("BR_PLACEHOLDER"));
    }

    #[test]
    fn test_only_deferred_tokens_remain() {
        let doc = transform(
            "a<br /><br />b\n\n\nc <YouTube id=\"v1\" />\n\n<PurchaseLinks links='[]' />\n\n![x](/x.png)",
        );
        assert!(!doc.html.contains("BR_PLACEHOLDER"));
        assert!(!doc.html.contains("DOUBLE_LINE_BREAK"));
        assert!(doc.html.contains("[YOUTUBE_PLACEHOLDER:djE=]"));
        assert!(doc.html.contains("[PURCHASE_LINKS_PLACEHOLDER:"));
        assert!(doc.html.contains("[IMAGE_PLACEHOLDER:/x.png:x]"));
    }
}
