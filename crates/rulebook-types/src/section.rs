use crate::{ImpactLevel, RuleRecord};
use serde::{Deserialize, Serialize};

/// One section of the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    pub id: String,
    pub title: String,
    pub order: i64,
    pub impact_level: ImpactLevel,
    pub description: String,
    /// File-name prefixes claimed by this section, in priority order
    pub rule_file_prefixes: Vec<String>,
}

impl SectionDescriptor {
    /// Position of the first prefix that claims `stem`, if any
    ///
    /// A prefix claims a stem equal to it or starting with `<prefix>-`.
    pub fn prefix_position(&self, stem: &str) -> Option<usize> {
        self.rule_file_prefixes.iter().position(|prefix| {
            stem == prefix
                || stem
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        })
    }
}

/// A section together with the rules assigned to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSection {
    pub descriptor: SectionDescriptor,
    pub rules: Vec<RuleRecord>,
}

impl ResolvedSection {
    pub fn new(descriptor: SectionDescriptor) -> Self {
        Self {
            descriptor,
            rules: Vec::new(),
        }
    }
}
