//! Markdown rendering

use lazy_static::lazy_static;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use regex::Regex;

use super::directives::{
    IMAGE_PREFIX, LINE_BREAK_PREFIX, LINK_LIST_PREFIX, PARAGRAPH_BREAK_MARKER, VIDEO_PREFIX,
};
use crate::config::MarkdownConfig;

lazy_static! {
    /// Bare URLs the way GFM autolinks them
    static ref BARE_URL_RE: Regex =
        Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]+").unwrap();
    /// Start of any placeholder token; a URL never runs into one
    static ref TOKEN_START_RE: Regex = Regex::new(&format!(
        r"\[(?:{}|{}|{}|{}):|{}",
        LINK_LIST_PREFIX,
        LINE_BREAK_PREFIX,
        VIDEO_PREFIX,
        IMAGE_PREFIX,
        regex::escape(PARAGRAPH_BREAK_MARKER)
    ))
    .unwrap();
}

/// Markdown renderer with configurable extensions
pub struct MarkdownRenderer {
    options: Options,
    autolink: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with every extension enabled
    pub fn new() -> Self {
        Self::with_config(&MarkdownConfig::default())
    }

    /// Create with custom settings
    pub fn with_config(config: &MarkdownConfig) -> Self {
        // YAML metadata blocks stay off, front-matter is split beforehand
        let mut options = Options::empty();
        if config.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if config.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if config.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if config.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }

        Self {
            options,
            autolink: config.autolink,
        }
    }

    /// Render markdown to HTML. Raw HTML passes through untouched.
    pub fn render(&self, markdown: &str) -> String {
        let parser = TextMergeStream::new(Parser::new_ext(markdown, self.options));

        let mut events: Vec<Event> = Vec::new();
        let mut link_depth = 0usize;
        let mut image_depth = 0usize;
        let mut in_code_block = false;

        for event in parser {
            match event {
                Event::Start(Tag::Link { .. }) => {
                    link_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::Start(Tag::Image { .. }) => {
                    image_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Image) => {
                    image_depth = image_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code_block = true;
                    events.push(event);
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    events.push(event);
                }
                Event::Text(text)
                    if self.autolink && link_depth == 0 && image_depth == 0 && !in_code_block =>
                {
                    linkify(text, &mut events);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a text event around bare URLs, emitting anchors for them
fn linkify<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    if !BARE_URL_RE.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    let mut pos = 0;
    while let Some(m) = BARE_URL_RE.find_at(&text, pos) {
        let url = trim_url(m.as_str());
        let start = m.start();
        if url.is_empty() || url.ends_with("://") {
            pos = m.end();
            continue;
        }
        let end = start + url.len();

        if start > last {
            events.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }

        let href = if url.len() >= 4 && url[..4].eq_ignore_ascii_case("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };
        events.push(Event::InlineHtml(CowStr::from(format!(
            r#"<a href="{}">{}</a>"#,
            html_escape::encode_double_quoted_attribute(&href),
            html_escape::encode_text(url)
        ))));
        last = end;
        pos = end;
    }

    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Drop trailing punctuation that GFM does not treat as part of a URL
fn trim_url(url: &str) -> &str {
    let url = match TOKEN_START_RE.find(url) {
        Some(token) => &url[..token.start()],
        None => url,
    };
    let mut url = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '"', '\'', '*', '_', '~']);
    // Unbalanced closing parens belong to the surrounding text
    while url.ends_with(')') && url.matches(')').count() > url.matches('(').count() {
        url = &url[..url.len() - 1];
        url = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '"', '\'']);
    }
    url
}
