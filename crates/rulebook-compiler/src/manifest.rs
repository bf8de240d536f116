//! Section manifest loading and rule-to-section resolution

use crate::error::{CompileError, Result};
use rulebook_types::{DocumentInfo, ImpactLevel, ResolvedSection, RuleRecord, SectionDescriptor};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    document: DocumentInfo,
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSection {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    order: Option<i64>,
    #[serde(default)]
    impact: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    prefixes: Option<Vec<String>>,
}

impl RawSection {
    fn into_descriptor(self) -> Result<SectionDescriptor> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(CompileError::manifest("section with an empty id"));
        }

        let order = self
            .order
            .ok_or_else(|| CompileError::manifest(format!("section '{id}' is missing 'order'")))?;

        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CompileError::manifest(format!("section '{id}' is missing 'title'")))?;

        let impact = self
            .impact
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| {
                CompileError::manifest(format!("section '{id}' has no impact level"))
            })?;
        let impact_level = impact
            .parse::<ImpactLevel>()
            .map_err(|e| CompileError::manifest(format!("section '{id}': {e}")))?;

        let rule_file_prefixes = match self.prefixes {
            None => vec![id.clone()],
            Some(prefixes) if prefixes.is_empty() => {
                return Err(CompileError::manifest(format!(
                    "section '{id}' lists no rule prefixes"
                )));
            }
            Some(prefixes) => {
                let prefixes: Vec<String> =
                    prefixes.into_iter().map(|p| p.trim().to_string()).collect();
                if prefixes.iter().any(String::is_empty) {
                    return Err(CompileError::manifest(format!(
                        "section '{id}' has an empty rule prefix"
                    )));
                }
                prefixes
            }
        };

        Ok(SectionDescriptor {
            id,
            title,
            order,
            impact_level,
            description: self.description.unwrap_or_default().trim().to_string(),
            rule_file_prefixes,
        })
    }
}

/// Parsed manifest: document front matter plus validated section descriptors
#[derive(Debug, Clone)]
pub struct SectionIndex {
    document: DocumentInfo,
    /// Descriptors in manifest (file) order; prefix matching walks this order
    sections: Vec<SectionDescriptor>,
    /// Indices into `sections`, sorted by `order` ascending
    by_order: Vec<usize>,
}

impl SectionIndex {
    /// Parse manifest text (YAML)
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawManifest = serde_yaml::from_str(text)
            .map_err(|e| CompileError::manifest(format!("invalid manifest: {e}")))?;

        if raw.document.title.trim().is_empty() {
            return Err(CompileError::manifest("document title is empty"));
        }
        if raw.sections.is_empty() {
            return Err(CompileError::manifest("manifest declares no sections"));
        }

        let sections = raw
            .sections
            .into_iter()
            .map(RawSection::into_descriptor)
            .collect::<Result<Vec<_>>>()?;

        let mut ids = HashSet::new();
        let mut orders: BTreeMap<i64, &str> = BTreeMap::new();
        for section in &sections {
            if !ids.insert(section.id.as_str()) {
                return Err(CompileError::manifest(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }
            if let Some(previous) = orders.insert(section.order, section.id.as_str()) {
                return Err(CompileError::manifest(format!(
                    "sections '{}' and '{}' share order {}; ordering must be total",
                    previous, section.id, section.order
                )));
            }
        }

        let mut by_order: Vec<usize> = (0..sections.len()).collect();
        by_order.sort_by_key(|&index| sections[index].order);

        Ok(Self {
            document: raw.document,
            sections,
            by_order,
        })
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
        let index = Self::parse(&text)?;
        info!(
            "Loaded manifest {:?} with {} sections",
            path,
            index.sections.len()
        );
        Ok(index)
    }

    /// Document front matter
    #[must_use]
    pub fn document(&self) -> &DocumentInfo {
        &self.document
    }

    /// Index of the section claiming a rule file stem, with the position of
    /// the matching prefix
    ///
    /// Sections are tried in manifest order; the first match wins.
    fn resolve(&self, stem: &str) -> Option<(usize, usize)> {
        self.sections
            .iter()
            .enumerate()
            .find_map(|(index, section)| section.prefix_position(stem).map(|pos| (index, pos)))
    }

    /// Assign every rule to exactly one section
    ///
    /// Sections come back in render order, each holding its rules ordered by
    /// matching prefix position, then file name. Sections without rules are
    /// kept. A rule that matches no section fails the whole assignment.
    pub fn assign(&self, rules: Vec<RuleRecord>) -> Result<Vec<ResolvedSection>> {
        let mut buckets: Vec<Vec<(usize, RuleRecord)>> = vec![Vec::new(); self.sections.len()];

        for rule in rules {
            let Some((index, pos)) = self.resolve(rule.stem()) else {
                return Err(CompileError::UnknownSection {
                    file: rule.source.clone(),
                });
            };
            debug!(
                "Rule '{}' assigned to section '{}'",
                rule.source, self.sections[index].id
            );
            buckets[index].push((pos, rule));
        }

        for bucket in &mut buckets {
            bucket.sort_by(|(a_pos, a), (b_pos, b)| {
                a_pos.cmp(b_pos).then_with(|| a.source.cmp(&b.source))
            });
        }

        let mut buckets: Vec<Option<Vec<(usize, RuleRecord)>>> =
            buckets.into_iter().map(Some).collect();

        Ok(self
            .by_order
            .iter()
            .map(|&index| {
                let mut resolved = ResolvedSection::new(self.sections[index].clone());
                resolved.rules = buckets[index]
                    .take()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(_, rule)| rule)
                    .collect();
                resolved
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const MANIFEST: &str = r#"
document:
  title: React Best Practices
  version: "1.0.0"
  abstract: Performance guidance.
sections:
  - id: rendering
    title: Rendering Performance
    order: 2
    impact: MEDIUM
    description: How things paint.
  - id: async
    title: Eliminating Waterfalls
    order: 1
    impact: CRITICAL
    prefixes: [async, waterfall]
"#;

    fn rule(source: &str) -> RuleRecord {
        RuleRecord {
            source: source.to_string(),
            title: source.to_string(),
            impact_level: None,
            impact_description: None,
            tags: BTreeSet::new(),
            body: String::new(),
        }
    }

    fn manifest_error(text: &str) -> String {
        match SectionIndex::parse(text).unwrap_err() {
            CompileError::ManifestParse { reason } => reason,
            other => panic!("expected manifest error, got {other}"),
        }
    }

    #[test]
    fn test_parse_orders_sections() {
        let index = SectionIndex::parse(MANIFEST).unwrap();
        let sections = index.assign(Vec::new()).unwrap();
        let ids: Vec<_> = sections.iter().map(|s| s.descriptor.id.as_str()).collect();
        assert_eq!(ids, vec!["async", "rendering"]);
        assert_eq!(index.document().version.as_deref(), Some("1.0.0"));

        let rendering = &sections[1].descriptor;
        assert_eq!(rendering.rule_file_prefixes, vec!["rendering".to_string()]);
        assert_eq!(rendering.impact_level, ImpactLevel::Medium);
    }

    #[test]
    fn test_assign_orders_by_prefix_then_name() {
        let index = SectionIndex::parse(MANIFEST).unwrap();
        let sections = index
            .assign(vec![
                rule("rendering-svg.md"),
                rule("waterfall-defer.md"),
                rule("async-suspense.md"),
                rule("async-api-routes.md"),
            ])
            .unwrap();

        let layout: Vec<Vec<&str>> = sections
            .iter()
            .map(|s| s.rules.iter().map(|r| r.source.as_str()).collect())
            .collect();
        assert_eq!(
            layout,
            vec![
                vec!["async-api-routes.md", "async-suspense.md", "waterfall-defer.md"],
                vec!["rendering-svg.md"],
            ]
        );
    }

    #[test]
    fn test_assign_keeps_empty_sections() {
        let index = SectionIndex::parse(MANIFEST).unwrap();
        let sections = index.assign(vec![rule("async-a.md")]).unwrap();
        assert_eq!(sections.len(), 2);
        assert!(sections[1].rules.is_empty());
    }

    #[test]
    fn test_unknown_section_names_file() {
        let index = SectionIndex::parse(MANIFEST).unwrap();
        let err = index
            .assign(vec![rule("async-a.md"), rule("misc-helpers.md")])
            .unwrap_err();
        match err {
            CompileError::UnknownSection { file } => assert_eq!(file, "misc-helpers.md"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_section_in_manifest_order_wins() {
        let text = r"
document: { title: T }
sections:
  - { id: late, title: Late, order: 2, impact: LOW, prefixes: [server] }
  - { id: early, title: Early, order: 1, impact: HIGH, prefixes: [server] }
";
        let index = SectionIndex::parse(text).unwrap();
        let sections = index.assign(vec![rule("server-cache.md")]).unwrap();
        assert_eq!(sections[0].descriptor.id, "early");
        assert!(sections[0].rules.is_empty());
        assert_eq!(sections[1].descriptor.id, "late");
        assert_eq!(sections[1].rules.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let reason = manifest_error(
            "document: { title: T }\nsections:\n  - { id: a, title: A, order: 1, impact: LOW }\n  - { id: a, title: B, order: 2, impact: LOW }\n",
        );
        assert!(reason.contains("duplicate section id 'a'"));
    }

    #[test]
    fn test_missing_order_rejected() {
        let reason = manifest_error(
            "document: { title: T }\nsections:\n  - { id: a, title: A, impact: LOW }\n",
        );
        assert!(reason.contains("missing 'order'"));
    }

    #[test]
    fn test_order_tie_rejected() {
        let reason = manifest_error(
            "document: { title: T }\nsections:\n  - { id: a, title: A, order: 1, impact: LOW }\n  - { id: b, title: B, order: 1, impact: LOW }\n",
        );
        assert!(reason.contains("share order 1"));
    }

    #[test]
    fn test_missing_impact_rejected() {
        let reason = manifest_error(
            "document: { title: T }\nsections:\n  - { id: a, title: A, order: 1, impact: '' }\n",
        );
        assert!(reason.contains("no impact level"));

        let reason = manifest_error(
            "document: { title: T }\nsections:\n  - { id: a, title: A, order: 1, impact: HUGE }\n",
        );
        assert!(reason.contains("unknown impact level"));
    }

    #[test]
    fn test_structural_problems_rejected() {
        assert!(manifest_error("document: { title: T }\nsections: []\n").contains("no sections"));
        assert!(manifest_error("sections: [").contains("invalid manifest"));
        assert!(manifest_error(
            "document: { title: T }\nsections:\n  - { id: a, title: A, order: 1, impact: LOW, colour: red }\n"
        )
        .contains("invalid manifest"));
        assert!(manifest_error(
            "document: { title: T }\nsections:\n  - { id: a, title: A, order: 1, impact: LOW, prefixes: [] }\n"
        )
        .contains("no rule prefixes"));
    }
}
