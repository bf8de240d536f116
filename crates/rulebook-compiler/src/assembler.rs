//! Document assembly and rendering
//!
//! Headings are synthesised and rule bodies are spliced in as literal text.
//! Bodies are never re-parsed: code fences and tables inside them must come
//! out exactly as they went in.

use crate::divider::{DividerPlan, DividerPolicy, DEFAULT_DIVIDER};
use crate::slug::slugify;
use rulebook_types::{
    CompiledDocument, DocumentInfo, RenderedDocument, ResolvedSection, RuleRecord, RuleSpan,
    TocEntry, TocLevel,
};
use std::fmt::Write;

/// Knobs for assembly and rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Divider placement policy
    pub divider_policy: DividerPolicy,
    /// Exact divider line
    pub divider: String,
    /// List rules under their section in the table of contents
    pub toc_rule_entries: bool,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            divider_policy: DividerPolicy::default(),
            divider: DEFAULT_DIVIDER.to_string(),
            toc_rule_entries: true,
        }
    }
}

/// Heading text of the section at 1-based position `number`
#[must_use]
pub fn section_heading(number: usize, title: &str) -> String {
    format!("{number}. {title}")
}

/// Builds and renders a [`CompiledDocument`]
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    options: AssemblerOptions,
}

impl Assembler {
    /// Create an assembler with the given options
    #[must_use]
    pub fn new(options: AssemblerOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[must_use]
    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Assemble ordered sections into a document with its table of contents
    #[must_use]
    pub fn assemble(&self, info: &DocumentInfo, sections: Vec<ResolvedSection>) -> CompiledDocument {
        let mut table_of_contents = Vec::new();

        for (index, section) in sections.iter().enumerate() {
            let title = &section.descriptor.title;
            table_of_contents.push(TocEntry {
                level: TocLevel::Section,
                label: title.clone(),
                anchor: slugify(&section_heading(index + 1, title)),
            });

            if self.options.toc_rule_entries {
                table_of_contents.extend(section.rules.iter().map(|rule| TocEntry {
                    level: TocLevel::Rule,
                    label: rule.title.clone(),
                    anchor: slugify(&rule.title),
                }));
            }
        }

        CompiledDocument {
            header: info.clone(),
            abstract_text: info.abstract_text.trim().to_string(),
            table_of_contents,
            sections,
        }
    }

    /// Render the document to markdown
    #[must_use]
    pub fn render(&self, document: &CompiledDocument) -> RenderedDocument {
        let plan = self
            .options
            .divider_policy
            .plan(&document.rules_per_section());

        let mut out = String::new();
        render_front(&mut out, document);
        render_toc(&mut out, document);
        if plan.after_toc {
            self.push_divider(&mut out);
        }
        let rule_spans = self.render_sections(&mut out, document, &plan);
        render_references(&mut out, &document.header.references);

        let trimmed = out.trim_end_matches(['\r', '\n']).len();
        out.truncate(trimmed);
        out.push('\n');

        RenderedDocument {
            text: out,
            table_of_contents: document.table_of_contents.clone(),
            rule_spans,
        }
    }

    fn push_divider(&self, out: &mut String) {
        out.push_str(&self.options.divider);
        out.push_str("\n\n");
    }

    fn render_sections(
        &self,
        out: &mut String,
        document: &CompiledDocument,
        plan: &DividerPlan,
    ) -> Vec<RuleSpan> {
        let mut spans = Vec::with_capacity(document.rule_count());

        for (i, section) in document.sections.iter().enumerate() {
            if plan.before_section.get(i).copied().unwrap_or(false) {
                self.push_divider(out);
            }

            let descriptor = &section.descriptor;
            let _ = write!(
                out,
                "## {}\n\n**Impact: {}**\n\n",
                section_heading(i + 1, &descriptor.title),
                descriptor.impact_level
            );
            if !descriptor.description.is_empty() {
                let _ = write!(out, "{}\n\n", descriptor.description);
            }

            for (j, rule) in section.rules.iter().enumerate() {
                spans.push(render_rule(out, rule));
                let divider_follows = plan
                    .after_rule
                    .get(i)
                    .and_then(|row| row.get(j))
                    .copied()
                    .unwrap_or(false);
                if divider_follows {
                    self.push_divider(out);
                }
            }
        }

        spans
    }
}

fn render_front(out: &mut String, document: &CompiledDocument) {
    let header = &document.header;
    let _ = write!(out, "# {}\n\n", header.title.trim());

    let byline: Vec<String> = [
        header.version.as_ref().map(|v| format!("**Version {}**", v.trim())),
        header.organization.as_ref().map(|o| o.trim().to_string()),
        header.date.as_ref().map(|d| d.trim().to_string()),
    ]
    .into_iter()
    .flatten()
    .filter(|line| !line.is_empty())
    .collect();
    for line in byline {
        let _ = write!(out, "{line}\n\n");
    }

    if let Some(note) = header.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        for line in note.lines() {
            let _ = writeln!(out, "> {line}");
        }
        out.push('\n');
    }

    if !document.abstract_text.is_empty() {
        let _ = write!(out, "## Abstract\n\n{}\n\n", document.abstract_text);
    }
}

fn render_toc(out: &mut String, document: &CompiledDocument) {
    out.push_str("## Table of Contents\n\n");

    let mut sections = document.sections.iter();
    let mut number = 0;
    for entry in &document.table_of_contents {
        match entry.level {
            TocLevel::Section => {
                number += 1;
                let impact = sections
                    .next()
                    .map(|s| s.descriptor.impact_level.as_str())
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "{number}. [{}](#{}) - **{impact}**",
                    entry.label, entry.anchor
                );
            }
            TocLevel::Rule => {
                let _ = writeln!(out, "   - [{}](#{})", entry.label, entry.anchor);
            }
        }
    }
    out.push('\n');
}

fn render_rule(out: &mut String, rule: &RuleRecord) -> RuleSpan {
    let _ = write!(out, "### {}\n\n", rule.title);

    if let Some(level) = rule.impact_level {
        match rule.impact_description.as_deref() {
            Some(description) => {
                let _ = write!(out, "**Impact: {level} ({description})**\n\n");
            }
            None => {
                let _ = write!(out, "**Impact: {level}**\n\n");
            }
        }
    }
    if !rule.tags.is_empty() {
        let tags: Vec<&str> = rule.tags.iter().map(String::as_str).collect();
        let _ = write!(out, "**Tags:** {}\n\n", tags.join(", "));
    }

    let body = strip_blank_lines(&rule.body);
    let start = out.len();
    out.push_str(body);
    let end = out.len();
    if !body.is_empty() {
        out.push_str("\n\n");
    }

    RuleSpan {
        source: rule.source.clone(),
        title: rule.title.clone(),
        range: start..end,
    }
}

/// Drop whitespace-only lines around a body, keeping every byte of the
/// first and last content lines (indentation, trailing hard-break spaces)
fn strip_blank_lines(body: &str) -> &str {
    let content_end = body.trim_end().len();
    if content_end == 0 {
        return "";
    }
    let end = body[content_end..]
        .find(['\r', '\n'])
        .map_or(body.len(), |offset| content_end + offset);
    let content_start = body.len() - body.trim_start().len();
    let start = body[..content_start].rfind('\n').map_or(0, |index| index + 1);
    &body[start..end]
}

fn render_references(out: &mut String, references: &[String]) {
    if references.is_empty() {
        return;
    }
    out.push_str("## References\n\n");
    for (index, reference) in references.iter().enumerate() {
        let reference = reference.trim();
        let _ = writeln!(out, "{}. [{reference}]({reference})", index + 1);
    }
}
