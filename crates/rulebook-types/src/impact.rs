use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How much a rule or section matters, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ImpactLevel {
    Critical,
    High,
    MediumHigh,
    Medium,
    LowMedium,
    Low,
}

/// Raised when an impact string names no known level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown impact level '{0}' (expected one of CRITICAL, HIGH, MEDIUM-HIGH, MEDIUM, LOW-MEDIUM, LOW)")]
pub struct ImpactLevelError(pub String);

impl ImpactLevel {
    /// All levels in severity order
    pub const ALL: [ImpactLevel; 6] = [
        ImpactLevel::Critical,
        ImpactLevel::High,
        ImpactLevel::MediumHigh,
        ImpactLevel::Medium,
        ImpactLevel::LowMedium,
        ImpactLevel::Low,
    ];

    /// Canonical upper-case label as rendered in the compiled document
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Critical => "CRITICAL",
            ImpactLevel::High => "HIGH",
            ImpactLevel::MediumHigh => "MEDIUM-HIGH",
            ImpactLevel::Medium => "MEDIUM",
            ImpactLevel::LowMedium => "LOW-MEDIUM",
            ImpactLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactLevel {
    type Err = ImpactLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('_', "-");
        ImpactLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| ImpactLevelError(s.trim().to_string()))
    }
}

impl TryFrom<String> for ImpactLevel {
    type Error = ImpactLevelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ImpactLevel> for String {
    fn from(level: ImpactLevel) -> Self {
        level.as_str().to_string()
    }
}
