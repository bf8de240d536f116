use crate::ResolvedSection;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Front matter of the compiled document, taken from the manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentInfo {
    pub title: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    /// Rendered verbatim; never derived from the clock
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TocLevel {
    Section,
    Rule,
}

/// One table-of-contents line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub level: TocLevel,
    pub label: String,
    /// Slug the entry links to, without the leading `#`
    pub anchor: String,
}

/// The assembled document before rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledDocument {
    pub header: DocumentInfo,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub table_of_contents: Vec<TocEntry>,
    pub sections: Vec<ResolvedSection>,
}

impl CompiledDocument {
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn rule_count(&self) -> usize {
        self.sections.iter().map(|s| s.rules.len()).sum()
    }

    /// Number of rules in each section, in document order
    pub fn rules_per_section(&self) -> Vec<usize> {
        self.sections.iter().map(|s| s.rules.len()).collect()
    }
}

/// Where a spliced rule body landed in the rendered text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpan {
    pub source: String,
    pub title: String,
    pub range: Range<usize>,
}

/// Final markdown text plus the bookkeeping the validator needs
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub text: String,
    pub table_of_contents: Vec<TocEntry>,
    pub rule_spans: Vec<RuleSpan>,
}

impl RenderedDocument {
    /// Text of one spliced rule body
    pub fn rule_text(&self, span: &RuleSpan) -> &str {
        self.text.get(span.range.clone()).unwrap_or_default()
    }
}
