//! Structural validation of rendered output
//!
//! Every check runs on every call; a report lists all failures together
//! instead of stopping at the first one.

use crate::assembler::{section_heading, AssemblerOptions};
use crate::divider::DividerPolicy;
use crate::error::{CompileError, Result};
use crate::frontmatter::METADATA_DELIMITER;
use crate::scan::{fence_count, headings, text_lines, FenceStyle, Heading};
use crate::slug::slugify;
use rulebook_types::{RenderedDocument, TocLevel};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Check names, stable for scripts reading the JSON report
pub mod checks {
    /// Section heading count matches the manifest
    pub const SECTION_HEADINGS: &str = "section-heading-count";
    /// Rule heading count matches the parsed rule files
    pub const RULE_HEADINGS: &str = "rule-heading-count";
    /// No metadata delimiter survived into the output
    pub const METADATA_DELIMITER: &str = "metadata-delimiter-absent";
    /// Divider count matches the divider policy
    pub const DIVIDERS: &str = "divider-count";
    /// Every TOC anchor names exactly one heading
    pub const ANCHORS: &str = "toc-anchors-resolve";
    /// Every spliced rule body has balanced code fences
    pub const FENCES: &str = "code-fences-balanced";
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Check name, one of [`checks`]
    pub name: &'static str,
    /// Whether the invariant holds
    pub passed: bool,
    /// What was found, naming offending files, sections or anchors
    pub detail: String,
}

impl CheckResult {
    fn new(name: &'static str, problems: Vec<String>, ok_detail: String) -> Self {
        if problems.is_empty() {
            Self {
                name,
                passed: true,
                detail: ok_detail,
            }
        } else {
            Self {
                name,
                passed: false,
                detail: problems.join("; "),
            }
        }
    }
}

/// All check outcomes for one rendered document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Results in checklist order
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    /// True when every check passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    /// Failed checks only
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|check| !check.passed)
    }

    /// Look up a check by name
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|check| check.name == name)
    }

    /// Turn a failing report into [`CompileError::StructuralValidation`]
    pub fn into_result(self) -> Result<Self> {
        let failures = self.failures().count();
        if failures == 0 {
            Ok(self)
        } else {
            Err(CompileError::StructuralValidation {
                failures,
                report: self,
            })
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            let status = if check.passed { "ok" } else { "FAIL" };
            writeln!(f, "  [{status:>4}] {}: {}", check.name, check.detail)?;
        }
        Ok(())
    }
}

/// Re-scans rendered output against the structural checklist
#[derive(Debug, Clone)]
pub struct Validator {
    divider_policy: DividerPolicy,
    divider: String,
}

fn is_section_heading(heading: &Heading<'_>) -> bool {
    heading.level == 2
        && heading.text.split_once(". ").is_some_and(|(number, title)| {
            !number.is_empty()
                && number.chars().all(|c| c.is_ascii_digit())
                && !title.trim().is_empty()
        })
}

impl Validator {
    /// Validator expecting the divider layout produced with `options`
    #[must_use]
    pub fn new(options: &AssemblerOptions) -> Self {
        Self {
            divider_policy: options.divider_policy,
            divider: options.divider.clone(),
        }
    }

    /// Run the full checklist
    ///
    /// `rules_per_section` comes from the parsed corpus, not from the output,
    /// so the counts are compared against what went in.
    #[must_use]
    pub fn validate(&self, rendered: &RenderedDocument, rules_per_section: &[usize]) -> ValidationReport {
        let text = rendered.text.as_str();
        let found = headings(text);

        ValidationReport {
            checks: vec![
                check_section_headings(&found, rules_per_section.len()),
                check_rule_headings(&found, rules_per_section.iter().sum()),
                check_metadata_delimiter(text),
                self.check_dividers(text, rules_per_section),
                check_anchors(rendered, &found),
                check_fences(rendered),
            ],
        }
    }

    fn check_dividers(&self, text: &str, rules_per_section: &[usize]) -> CheckResult {
        let expected = self.divider_policy.expected_count(rules_per_section);
        let actual = text_lines(text)
            .filter(|line| line.trim_end() == self.divider)
            .count();
        let mut problems = Vec::new();
        if actual != expected {
            problems.push(format!(
                "found {actual} '{}' dividers, policy {} expects {expected}",
                self.divider, self.divider_policy
            ));
        }
        CheckResult::new(
            checks::DIVIDERS,
            problems,
            format!("{actual} dividers ({})", self.divider_policy),
        )
    }
}

fn check_section_headings(found: &[Heading<'_>], expected: usize) -> CheckResult {
    let actual = found.iter().filter(|h| is_section_heading(h)).count();
    let mut problems = Vec::new();
    if actual != expected {
        problems.push(format!(
            "found {actual} section headings, manifest declares {expected}"
        ));
    }
    CheckResult::new(
        checks::SECTION_HEADINGS,
        problems,
        format!("{actual} section headings"),
    )
}

fn check_rule_headings(found: &[Heading<'_>], expected: usize) -> CheckResult {
    let actual = found.iter().filter(|h| h.level == 3).count();
    let mut problems = Vec::new();
    if actual != expected {
        problems.push(format!(
            "found {actual} rule headings, corpus has {expected} rule files"
        ));
    }
    CheckResult::new(
        checks::RULE_HEADINGS,
        problems,
        format!("{actual} rule headings"),
    )
}

fn check_metadata_delimiter(text: &str) -> CheckResult {
    let lines: Vec<String> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| line.trim_end() == METADATA_DELIMITER)
        .map(|(index, _)| (index + 1).to_string())
        .collect();
    let mut problems = Vec::new();
    if !lines.is_empty() {
        problems.push(format!(
            "'{METADATA_DELIMITER}' found on output line(s) {}",
            lines.join(", ")
        ));
    }
    CheckResult::new(
        checks::METADATA_DELIMITER,
        problems,
        "no metadata delimiters".to_string(),
    )
}

fn check_anchors(rendered: &RenderedDocument, found: &[Heading<'_>]) -> CheckResult {
    let mut by_slug: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for heading in found {
        let slug = slugify(heading.text);
        if !slug.is_empty() {
            by_slug.entry(slug).or_default().push(heading.text);
        }
    }

    let mut problems = Vec::new();
    let mut section_number = 0;
    for entry in &rendered.table_of_contents {
        let expected_anchor = match entry.level {
            TocLevel::Section => {
                section_number += 1;
                slugify(&section_heading(section_number, &entry.label))
            }
            TocLevel::Rule => slugify(&entry.label),
        };
        if expected_anchor != entry.anchor {
            problems.push(format!(
                "TOC entry '{}' links to '#{}' but its heading slugs to '#{expected_anchor}'",
                entry.label, entry.anchor
            ));
        }
        if !by_slug.contains_key(&entry.anchor) {
            problems.push(format!(
                "TOC anchor '#{}' ('{}') matches no heading",
                entry.anchor, entry.label
            ));
        }
    }

    // body sub-headings may repeat freely; only linked anchors must be unique
    let targeted: BTreeSet<&str> = rendered
        .table_of_contents
        .iter()
        .map(|entry| entry.anchor.as_str())
        .collect();
    for (slug, titles) in &by_slug {
        if titles.len() > 1 && targeted.contains(slug.as_str()) {
            let titles: Vec<String> = titles.iter().map(|t| format!("'{t}'")).collect();
            problems.push(format!(
                "anchor '#{slug}' is shared by {} headings: {}",
                titles.len(),
                titles.join(", ")
            ));
        }
    }

    CheckResult::new(
        checks::ANCHORS,
        problems,
        format!(
            "{} TOC anchors resolve to unique headings",
            rendered.table_of_contents.len()
        ),
    )
}

fn check_fences(rendered: &RenderedDocument) -> CheckResult {
    let mut problems = Vec::new();
    for span in &rendered.rule_spans {
        let body = rendered.rule_text(span);
        for style in [FenceStyle::Backtick, FenceStyle::Tilde] {
            let count = fence_count(body, style);
            if count % 2 != 0 {
                problems.push(format!(
                    "rule '{}' ({}) has {count} '{style}' fence delimiters",
                    span.title, span.source
                ));
            }
        }
    }
    CheckResult::new(
        checks::FENCES,
        problems,
        format!("{} rule bodies balanced", rendered.rule_spans.len()),
    )
}
