//! Rule file parsing
//!
//! A rule file may start with a metadata block delimited by `---` lines.
//! Everything after the closing delimiter is the body, kept byte for byte.

use crate::error::{CompileError, Result};
use regex::Regex;
use rulebook_types::{ImpactLevel, RuleMetadata, RuleRecord};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Line that opens and closes a metadata block
pub const METADATA_DELIMITER: &str = "---";

/// Metadata block split from a rule file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter<'a> {
    /// Parsed key/value pairs, last occurrence wins
    pub metadata: RuleMetadata,
    /// 1-based line of the winning occurrence of each key
    pub key_lines: BTreeMap<String, usize>,
    /// Everything after the closing delimiter line, untouched
    pub body: &'a str,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == METADATA_DELIMITER
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Split raw file text into metadata and body
///
/// A file that does not open with the delimiter has no metadata and is
/// returned whole as body.
pub fn split_frontmatter<'a>(file: &str, text: &'a str) -> Result<Frontmatter<'a>> {
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok(Frontmatter {
            body: text,
            ..Frontmatter::default()
        });
    };
    if !is_delimiter(first) {
        return Ok(Frontmatter {
            body: text,
            ..Frontmatter::default()
        });
    }

    let key_re = Regex::new(r"^\s*([A-Za-z0-9_][A-Za-z0-9_.-]*)\s*:(.*)$").map_err(|e| {
        CompileError::MetadataParse {
            file: file.to_string(),
            line: 1,
            reason: format!("failed to compile key pattern: {e}"),
        }
    })?;

    let mut metadata = RuleMetadata::new();
    let mut key_lines = BTreeMap::new();
    let mut offset = first.len();

    for (index, raw) in lines.enumerate() {
        let line_no = index + 2;
        offset += raw.len();

        if is_delimiter(raw) {
            return Ok(Frontmatter {
                metadata,
                key_lines,
                body: &text[offset..],
            });
        }

        let line = raw.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let captures = key_re
            .captures(line)
            .ok_or_else(|| CompileError::MetadataParse {
                file: file.to_string(),
                line: line_no,
                reason: format!("expected 'key: value', found '{}'", line.trim()),
            })?;
        let key = captures.get(1).map_or("", |m| m.as_str()).to_string();
        let value = captures.get(2).map_or("", |m| m.as_str()).trim();

        key_lines.insert(key.clone(), line_no);
        metadata.insert(key, unquote(value).to_string());
    }

    Err(CompileError::MetadataParse {
        file: file.to_string(),
        line: 1,
        reason: format!("opening '{METADATA_DELIMITER}' has no closing '{METADATA_DELIMITER}'"),
    })
}

/// Title used when a rule carries none: `async-parallel` becomes `Async parallel`
fn title_from_stem(stem: &str) -> String {
    let words = stem.replace(['-', '_'], " ");
    let mut chars = words.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn non_empty<'m>(metadata: &'m RuleMetadata, key: &str) -> Option<&'m str> {
    metadata
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Parse one rule file into a [`RuleRecord`]
pub fn parse_rule(file: &str, text: &str) -> Result<RuleRecord> {
    let frontmatter = split_frontmatter(file, text)?;
    let metadata = &frontmatter.metadata;

    let title = match non_empty(metadata, "title") {
        Some(title) => title.to_string(),
        None => {
            let stem = file.strip_suffix(".md").unwrap_or(file);
            warn!("Rule '{}' has no title, deriving one from the file name", file);
            title_from_stem(stem)
        }
    };

    let impact_level = non_empty(metadata, "impact")
        .map(|raw| {
            raw.parse::<ImpactLevel>()
                .map_err(|e| CompileError::MetadataParse {
                    file: file.to_string(),
                    line: frontmatter.key_lines.get("impact").copied().unwrap_or(1),
                    reason: e.to_string(),
                })
        })
        .transpose()?;

    let tags: BTreeSet<String> = metadata
        .get("tags")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(RuleRecord {
        source: file.to_string(),
        title,
        impact_level,
        impact_description: non_empty(metadata, "impactDescription").map(ToString::to_string),
        tags,
        body: frontmatter.body.to_string(),
    })
}
