//! Directive preprocessing
//!
//! Custom inline directives (`<PurchaseLinks>`, `<br />` runs, `<YouTube>`,
//! and blank-line gaps) would be mangled by Markdown conversion, so they are
//! swapped for plain-text placeholder tokens first. Each stage works on the
//! output of the previous one:
//!
//! 1. link lists
//! 2. forced line breaks
//! 3. video embeds
//! 4. paragraph breaks
//!
//! Tokens produced by one stage never match a later stage's pattern.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    /// `<PurchaseLinks links='[...]' />` with either quote style
    pub(crate) static ref LINK_LIST_RE: Regex =
        Regex::new(r#"(?s)<PurchaseLinks\s+links=(?:'(.*?)'|"(.*?)")\s*/>"#).unwrap();
    /// A run of `<br>` tags, whitespace between them included
    static ref LINE_BREAK_RUN_RE: Regex =
        Regex::new(r"(?i)<br\s*/?>(?:\s*<br\s*/?>)*").unwrap();
    static ref LINE_BREAK_TAG_RE: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    /// A non-blank id is required; anything else is caught as stray
    static ref VIDEO_RE: Regex =
        Regex::new(r#"<YouTube\s+id=(?:"\s*([^"\s]+)\s*"|'\s*([^'\s]+)\s*')\s*/>"#).unwrap();
    /// Any `<YouTube ...>` tag left over after extraction
    static ref STRAY_VIDEO_RE: Regex = Regex::new(r"<YouTube\b[^>]*>").unwrap();
}

pub(crate) const LINK_LIST_PREFIX: &str = "PURCHASE_LINKS_PLACEHOLDER";
pub(crate) const LINE_BREAK_PREFIX: &str = "BR_PLACEHOLDER";
pub(crate) const VIDEO_PREFIX: &str = "YOUTUBE_PLACEHOLDER";
pub(crate) const IMAGE_PREFIX: &str = "IMAGE_PLACEHOLDER";
pub(crate) const PARAGRAPH_BREAK_MARKER: &str = "[DOUBLE_LINE_BREAK]";

/// Failure snippets are cut to this many characters
pub(crate) const FAILURE_SOURCE_CHARS: usize = 120;

/// One entry of a purchase link list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLink {
    pub url: String,
    pub label: String,
}

/// A textual marker standing in for a directive or fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Base64 of the link list JSON
    LinkList(String),
    /// A run of `count` line breaks; `index` numbers the runs of a document
    LineBreaks { index: usize, count: usize },
    /// Video id, base64 in the token text so `_` and `*` never read as emphasis
    Video(String),
    ParagraphBreak,
    /// Image source and caption, both already escaped for the token
    Image { src: String, caption: String },
}

impl Placeholder {
    /// Encode a link list payload, validating it first.
    ///
    /// The JSON text itself is embedded so the round trip is lossless.
    pub fn link_list(json: &str) -> Result<Self, String> {
        parse_link_list(json)?;
        Ok(Placeholder::LinkList(STANDARD.encode(json.as_bytes())))
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::LinkList(encoded) => write!(f, "[{}:{}]", LINK_LIST_PREFIX, encoded),
            Placeholder::LineBreaks { index, count } => {
                write!(f, "[{}:{}:{}]", LINE_BREAK_PREFIX, index, count)
            }
            Placeholder::Video(id) => {
                write!(f, "[{}:{}]", VIDEO_PREFIX, STANDARD.encode(id.as_bytes()))
            }
            Placeholder::ParagraphBreak => f.write_str(PARAGRAPH_BREAK_MARKER),
            Placeholder::Image { src, caption } => {
                write!(f, "[{}:{}:{}]", IMAGE_PREFIX, src, caption)
            }
        }
    }
}

/// Parse a link list JSON payload
pub fn parse_link_list(json: &str) -> Result<Vec<PurchaseLink>, String> {
    serde_json::from_str::<Vec<PurchaseLink>>(json).map_err(|e| e.to_string())
}

/// Decode the base64 payload of a link list token
pub fn decode_link_list(encoded: &str) -> Result<Vec<PurchaseLink>, String> {
    let bytes = STANDARD.decode(encoded).map_err(|e| e.to_string())?;
    let json = String::from_utf8(bytes).map_err(|e| e.to_string())?;
    parse_link_list(&json)
}

/// Decode the base64 payload of a video token
pub fn decode_video_id(encoded: &str) -> Result<String, String> {
    let bytes = STANDARD.decode(encoded).map_err(|e| e.to_string())?;
    let id = String::from_utf8(bytes).map_err(|e| e.to_string())?;
    if id.trim().is_empty() {
        return Err("empty video id".to_string());
    }
    Ok(id)
}

/// Which directive a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    LinkList,
    Video,
    Image,
}

/// A directive that was left as literal text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveFailure {
    pub kind: DirectiveKind,
    /// The directive text as found
    pub source: String,
    pub reason: String,
}

impl DirectiveFailure {
    pub(crate) fn new(kind: DirectiveKind, source: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!("Leaving {:?} directive as text: {}", kind, reason);
        Self {
            kind,
            source: truncate(source, FAILURE_SOURCE_CHARS),
            reason,
        }
    }
}

/// Text after preprocessing, plus what each stage did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preprocessed {
    pub text: String,
    pub link_lists: usize,
    pub line_break_runs: usize,
    pub videos: usize,
    pub paragraph_breaks: usize,
    pub failures: Vec<DirectiveFailure>,
}

/// Run every stage in order
pub fn preprocess(body: &str) -> Preprocessed {
    let mut state = Preprocessed {
        text: body.to_string(),
        ..Default::default()
    };

    extract_link_lists(&mut state);
    collapse_line_breaks(&mut state);
    extract_videos(&mut state);
    mark_paragraph_breaks(&mut state);

    tracing::debug!(
        "Preprocessed: {} link lists, {} break runs, {} videos, {} paragraph breaks",
        state.link_lists,
        state.line_break_runs,
        state.videos,
        state.paragraph_breaks
    );

    state
}

fn extract_link_lists(state: &mut Preprocessed) {
    let mut count = 0;
    let mut failures = Vec::new();

    let text = LINK_LIST_RE.replace_all(&state.text, |caps: &Captures| {
        let whole = &caps[0];
        let json = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        match Placeholder::link_list(json) {
            Ok(token) => {
                count += 1;
                token.to_string()
            }
            Err(reason) => {
                failures.push(DirectiveFailure::new(DirectiveKind::LinkList, whole, reason));
                whole.to_string()
            }
        }
    });

    state.text = text.into_owned();
    state.link_lists += count;
    state.failures.extend(failures);
}

fn collapse_line_breaks(state: &mut Preprocessed) {
    let mut index = 0;

    let text = LINE_BREAK_RUN_RE.replace_all(&state.text, |caps: &Captures| {
        let count = LINE_BREAK_TAG_RE.find_iter(&caps[0]).count();
        let token = Placeholder::LineBreaks { index, count };
        index += 1;
        token.to_string()
    });

    state.text = text.into_owned();
    state.line_break_runs += index;
}

fn extract_videos(state: &mut Preprocessed) {
    let mut count = 0;

    let text = VIDEO_RE.replace_all(&state.text, |caps: &Captures| {
        let id = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        count += 1;
        Placeholder::Video(id.to_string()).to_string()
    });

    state.text = text.into_owned();
    state.videos += count;

    for stray in STRAY_VIDEO_RE.find_iter(&state.text) {
        state.failures.push(DirectiveFailure::new(
            DirectiveKind::Video,
            stray.as_str(),
            "missing or blank id attribute",
        ));
    }
}

/// Replace every run of three or more newlines between two lines of text
/// with a paragraph holding only the paragraph-break marker.
fn mark_paragraph_breaks(state: &mut Preprocessed) {
    let text = &state.text;
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 32);
    let mut last = 0;
    let mut count = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\n' {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i] == b'\n' {
            i += 1;
        }

        // Only gaps with text on both sides
        if i - start >= 3 && start > 0 && i < bytes.len() {
            out.push_str(&text[last..start]);
            out.push_str("\n\n");
            out.push_str(PARAGRAPH_BREAK_MARKER);
            out.push_str("\n\n");
            last = i;
            count += 1;
        }
    }

    if count > 0 {
        out.push_str(&text[last..]);
        state.text = out;
        state.paragraph_breaks += count;
    }
}

pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
