use crate::ImpactLevel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Flat `key: value` pairs read from a rule file's metadata block
///
/// Later occurrences of a key replace earlier ones.
pub type RuleMetadata = BTreeMap<String, String>;

/// A single parsed rule file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// File name the rule was read from (e.g. `async-parallel.md`)
    pub source: String,
    pub title: String,
    pub impact_level: Option<ImpactLevel>,
    pub impact_description: Option<String>,
    pub tags: BTreeSet<String>,
    /// Markdown body exactly as it appeared after the metadata block
    pub body: String,
}

impl RuleRecord {
    /// File stem used for section prefix matching
    pub fn stem(&self) -> &str {
        self.source
            .strip_suffix(".md")
            .unwrap_or(self.source.as_str())
    }
}
