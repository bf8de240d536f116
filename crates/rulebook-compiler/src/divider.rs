//! Divider placement policy
//!
//! Placement lives in one pure function, [`DividerPolicy::plan`]. The
//! assembler renders from the plan and the validator derives the expected
//! divider count from the same plan, so changing the policy touches nothing
//! else.

use crate::frontmatter::METADATA_DELIMITER;
use crate::scan::FenceStyle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default divider line; must differ from the metadata delimiter
pub const DEFAULT_DIVIDER: &str = "***";

/// Divider text that could never pass the structural checks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DividerError {
    /// Every blank line would count as a divider
    #[error("divider must not be empty")]
    Empty,

    /// Lines are compared without surrounding whitespace
    #[error("divider '{0}' has leading or trailing whitespace")]
    Whitespace(String),

    /// A divider is one output line
    #[error("divider must be a single line")]
    MultiLine,

    /// Collides with the metadata-delimiter check
    #[error("divider must differ from the metadata delimiter '{}'", METADATA_DELIMITER)]
    MetadataDelimiter,

    /// Would open a code fence or a heading
    #[error("divider '{0}' must not start with '```', '~~~' or '#'")]
    Markup(String),
}

/// Reject divider text the validator could never count correctly
pub fn check_divider(divider: &str) -> Result<(), DividerError> {
    if divider.is_empty() {
        return Err(DividerError::Empty);
    }
    if divider.contains(['\n', '\r']) {
        return Err(DividerError::MultiLine);
    }
    if divider.trim() != divider {
        return Err(DividerError::Whitespace(divider.to_string()));
    }
    if divider == METADATA_DELIMITER {
        return Err(DividerError::MetadataDelimiter);
    }
    let opens_markup = divider.starts_with('#')
        || [FenceStyle::Backtick, FenceStyle::Tilde]
            .into_iter()
            .any(|style| divider.starts_with(style.marker()));
    if opens_markup {
        return Err(DividerError::Markup(divider.to_string()));
    }
    Ok(())
}

/// Where horizontal dividers go in the compiled document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DividerPolicy {
    /// One after the TOC, then one between every pair of adjacent rules,
    /// across section boundaries too
    #[default]
    BetweenRules,
    /// One after the TOC, then only between rules of the same section
    WithinSections,
    /// One after the TOC, between rules of the same section, and before
    /// every section heading but the first
    BetweenRulesAndSections,
}

/// Concrete divider positions for one document shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DividerPlan {
    /// Divider right after the table of contents
    pub after_toc: bool,
    /// Divider before each section heading
    pub before_section: Vec<bool>,
    /// Divider after each rule, indexed `[section][rule]`
    pub after_rule: Vec<Vec<bool>>,
}

impl DividerPlan {
    /// Total dividers this plan places
    #[must_use]
    pub fn count(&self) -> usize {
        usize::from(self.after_toc)
            + self.before_section.iter().filter(|d| **d).count()
            + self.after_rule.iter().flatten().filter(|d| **d).count()
    }
}

impl DividerPolicy {
    /// Place dividers for a document whose sections hold `rules_per_section` rules
    #[must_use]
    pub fn plan(self, rules_per_section: &[usize]) -> DividerPlan {
        let total_rules: usize = rules_per_section.iter().sum();
        let sections = rules_per_section.len();

        let mut seen = 0;
        let after_rule: Vec<Vec<bool>> = rules_per_section
            .iter()
            .map(|&count| {
                (0..count)
                    .map(|index| {
                        seen += 1;
                        match self {
                            DividerPolicy::BetweenRules => seen < total_rules,
                            DividerPolicy::WithinSections
                            | DividerPolicy::BetweenRulesAndSections => index + 1 < count,
                        }
                    })
                    .collect::<Vec<bool>>()
            })
            .collect();

        let (after_toc, before_section) = match self {
            DividerPolicy::BetweenRules | DividerPolicy::WithinSections => {
                (total_rules > 0, vec![false; sections])
            }
            DividerPolicy::BetweenRulesAndSections => {
                (sections > 0, (0..sections).map(|index| index > 0).collect())
            }
        };

        DividerPlan {
            after_toc,
            before_section,
            after_rule,
        }
    }

    /// Dividers expected in a document with this shape
    #[must_use]
    pub fn expected_count(self, rules_per_section: &[usize]) -> usize {
        self.plan(rules_per_section).count()
    }

    /// Configuration name of this policy
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DividerPolicy::BetweenRules => "between-rules",
            DividerPolicy::WithinSections => "within-sections",
            DividerPolicy::BetweenRulesAndSections => "between-rules-and-sections",
        }
    }
}

impl fmt::Display for DividerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DividerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            DividerPolicy::BetweenRules,
            DividerPolicy::WithinSections,
            DividerPolicy::BetweenRulesAndSections,
        ]
        .into_iter()
        .find(|policy| policy.as_str() == s.trim())
        .ok_or_else(|| {
            format!(
                "unknown divider policy '{s}' (expected between-rules, within-sections or between-rules-and-sections)"
            )
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_between_rules_count() {
        let policy = DividerPolicy::BetweenRules;
        // 8 sections, 17 rules: 1 after the TOC + 16 between rules
        assert_eq!(policy.expected_count(&[3, 2, 2, 3, 1, 2, 2, 2]), 17);
        assert_eq!(policy.expected_count(&[1]), 1);
        assert_eq!(policy.expected_count(&[]), 0);
        assert_eq!(policy.expected_count(&[0, 0]), 0);
        for rules in [vec![4], vec![2, 0, 5], vec![1, 1, 1, 1]] {
            let total: usize = rules.iter().sum();
            assert_eq!(policy.expected_count(&rules), 1 + (total - 1));
        }
    }

    #[test]
    fn test_between_rules_never_after_final_rule() {
        let plan = DividerPolicy::BetweenRules.plan(&[2, 0, 1]);
        assert!(plan.after_toc);
        assert_eq!(plan.after_rule, vec![vec![true, true], vec![], vec![false]]);
        assert_eq!(plan.before_section, vec![false, false, false]);
    }

    #[test]
    fn test_within_sections() {
        let plan = DividerPolicy::WithinSections.plan(&[2, 3]);
        assert_eq!(plan.after_rule, vec![vec![true, false], vec![true, true, false]]);
        assert_eq!(plan.count(), 1 + 1 + 2);
        assert_eq!(DividerPolicy::WithinSections.expected_count(&[]), 0);
    }

    #[test]
    fn test_between_rules_and_sections() {
        let plan = DividerPolicy::BetweenRulesAndSections.plan(&[2, 0, 1]);
        assert_eq!(plan.before_section, vec![false, true, true]);
        assert_eq!(plan.count(), 1 + 2 + 1);
        // sections still get dividers when there are no rules at all
        assert_eq!(DividerPolicy::BetweenRulesAndSections.expected_count(&[0, 0]), 2);
    }

    #[test]
    fn test_parse_round_trip_names() {
        for policy in [
            DividerPolicy::BetweenRules,
            DividerPolicy::WithinSections,
            DividerPolicy::BetweenRulesAndSections,
        ] {
            assert_eq!(policy.as_str().parse::<DividerPolicy>().unwrap(), policy);
        }
        assert!("sometimes".parse::<DividerPolicy>().is_err());
    }

    #[test]
    fn test_check_divider_accepts_thematic_breaks() {
        for divider in [DEFAULT_DIVIDER, "- - -", "___", "----"] {
            assert_eq!(check_divider(divider), Ok(()), "{divider}");
        }
    }

    #[test]
    fn test_check_divider_rejects_empty() {
        assert_eq!(check_divider(""), Err(DividerError::Empty));
    }

    #[test]
    fn test_check_divider_rejects_surrounding_whitespace() {
        assert!(matches!(check_divider("*** "), Err(DividerError::Whitespace(_))));
        assert!(matches!(check_divider(" ***"), Err(DividerError::Whitespace(_))));
        assert!(matches!(check_divider("***\t"), Err(DividerError::Whitespace(_))));
    }

    #[test]
    fn test_check_divider_rejects_multiple_lines() {
        assert_eq!(check_divider("***\n***"), Err(DividerError::MultiLine));
        assert_eq!(check_divider("***\r\n"), Err(DividerError::MultiLine));
    }

    #[test]
    fn test_check_divider_rejects_metadata_delimiter() {
        assert_eq!(check_divider("---"), Err(DividerError::MetadataDelimiter));
    }

    #[test]
    fn test_check_divider_rejects_fences_and_headings() {
        for divider in ["```", "~~~~", "# break"] {
            assert!(matches!(check_divider(divider), Err(DividerError::Markup(_))), "{divider}");
        }
    }
}
