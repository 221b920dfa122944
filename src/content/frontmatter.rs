//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Front-matter data of a work entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub title: String,
    pub date: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// A content file split into its metadata block and body text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDocument<'a> {
    /// YAML between the `---` fences, if the file has a complete block
    pub metadata_block: Option<&'a str>,
    pub body: &'a str,
}

impl<'a> RawDocument<'a> {
    pub fn split(content: &'a str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        match split_block(content) {
            Some((block, body)) => Self {
                metadata_block: Some(block),
                body,
            },
            None => Self {
                metadata_block: None,
                body: content,
            },
        }
    }
}

impl Frontmatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// Never fails: a malformed block yields whatever fields could be read,
    /// the rest stay at their defaults.
    pub fn parse(content: &str) -> (Self, &str) {
        let raw = RawDocument::split(content);
        (Self::from_raw(&raw), raw.body)
    }

    /// Read the metadata block of an already split document
    pub fn from_raw(raw: &RawDocument<'_>) -> Self {
        raw.metadata_block
            .map(Self::from_block)
            .unwrap_or_default()
    }

    fn from_block(block: &str) -> Self {
        if block.trim().is_empty() {
            return Frontmatter::default();
        }

        match serde_yaml::from_str::<Value>(block) {
            Ok(Value::Mapping(map)) => Self::from_mapping(&map),
            Ok(Value::Null) => Frontmatter::default(),
            Ok(_) => {
                tracing::warn!("Front-matter is not a mapping, ignoring it");
                Frontmatter::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse YAML front-matter, reading fields line by line: {}",
                    e
                );
                Self::from_mapping(&parse_lines(block))
            }
        }
    }

    fn from_mapping(map: &Mapping) -> Self {
        let field = |key: &str| map.get(key).and_then(scalar_to_string);

        Self {
            title: field("title").unwrap_or_default(),
            date: field("date").unwrap_or_default(),
            category: field("category").unwrap_or_default(),
            thumbnail: field("thumbnail").filter(|t| !t.is_empty()),
        }
    }

    /// Parse the date string into a NaiveDateTime
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        parse_date_string(&self.date)
    }

    /// Whether this entry belongs to the given listing category
    pub fn is_in_category(&self, category: &str) -> bool {
        self.category == category
    }
}

/// Split a `---` fenced block off the start of the document.
/// Returns None when there is no complete block.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let start = content.trim_start_matches(['\n', '\r']);
    let rest = strip_fence_line(start)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((block, body.trim_start_matches(['\n', '\r'])));
        }
        offset += line.len();
    }

    None
}

fn strip_fence_line(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    if let Some(rest) = rest.strip_prefix("\r\n") {
        Some(rest)
    } else {
        rest.strip_prefix('\n')
    }
}

/// Read `key: value` lines one at a time, skipping the ones that don't parse
fn parse_lines(block: &str) -> Mapping {
    let mut map = Mapping::new();

    for line in block.lines() {
        if line.starts_with([' ', '\t', '#', '-']) {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        match serde_yaml::from_str::<Value>(value.trim()) {
            Ok(value) => {
                map.insert(Value::String(key.to_string()), value);
            }
            Err(e) => tracing::debug!("Skipping front-matter field '{}': {}", key, e),
        }
    }

    map
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset, compared in UTC
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Midnight Drive
date: 2024-01-15
category: Release
thumbnail: https://example.com/cover.png
---

This is the content.
"#;

        let (fm, body) = Frontmatter::parse(content);
        assert_eq!(fm.title, "Midnight Drive");
        assert_eq!(fm.date, "2024-01-15");
        assert_eq!(fm.category, "Release");
        assert_eq!(fm.thumbnail.as_deref(), Some("https://example.com/cover.png"));
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let (fm, body) = Frontmatter::parse("---\ntitle: Only Title\n---\nBody");
        assert_eq!(fm.title, "Only Title");
        assert_eq!(fm.date, "");
        assert_eq!(fm.category, "");
        assert_eq!(fm.thumbnail, None);
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_empty_thumbnail_is_absent() {
        let (fm, _) = Frontmatter::parse("---\nthumbnail: ''\n---\n");
        assert_eq!(fm.thumbnail, None);
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, body) = Frontmatter::parse("# Heading\n\nText");
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "# Heading\n\nText");
    }

    #[test]
    fn test_unterminated_block_is_body() {
        let content = "---\ntitle: Nope\n\nStill body";
        let (fm, body) = Frontmatter::parse(content);
        assert_eq!(fm.title, "");
        assert_eq!(body, content);
    }

    #[test]
    fn test_non_scalar_field_is_absent() {
        let content = "---\ntitle:\n  - a\n  - b\ncategory: Live\n---\nBody";
        let (fm, body) = Frontmatter::parse(content);
        assert_eq!(fm.title, "");
        assert_eq!(fm.category, "Live");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_malformed_yaml_keeps_readable_fields() {
        let content = "---\ntitle: Good\ncategory: [unterminated\ndate: 2023-05-01\n---\nBody";
        let (fm, body) = Frontmatter::parse(content);
        assert_eq!(fm.title, "Good");
        assert_eq!(fm.category, "");
        assert_eq!(fm.date, "2023-05-01");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_raw_document_split() {
        let raw = RawDocument::split("---\ntitle: A\n---\nBody");
        assert_eq!(raw.metadata_block, Some("title: A\n"));
        assert_eq!(raw.body, "Body");

        let raw = RawDocument::split("Just body");
        assert_eq!(raw.metadata_block, None);
        assert_eq!(raw.body, "Just body");
    }

    #[test]
    fn test_crlf_and_bom() {
        let content = "\u{feff}---\r\ntitle: Windows\r\n---\r\nBody";
        let (fm, body) = Frontmatter::parse(content);
        assert_eq!(fm.title, "Windows");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_numbers_are_stringified() {
        let (fm, _) = Frontmatter::parse("---\ntitle: 1999\n---\n");
        assert_eq!(fm.title, "1999");
    }

    #[test]
    fn test_parse_date() {
        let fm = Frontmatter {
            date: "2024-01-15 10:30:00".to_string(),
            ..Default::default()
        };
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        assert!(parse_date_string("2024-03-01T12:00:00+09:00").is_some());
        assert!(parse_date_string("not a date").is_none());
        assert!(parse_date_string("").is_none());
    }
}
