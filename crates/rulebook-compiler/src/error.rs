//! Error types for rule compilation

use crate::validator::ValidationReport;
use std::path::PathBuf;
use thiserror::Error;

/// Compilation errors
#[derive(Debug, Error)]
pub enum CompileError {
    /// Malformed or unterminated metadata block in a rule file
    #[error("Metadata error in '{file}' (line {line}): {reason}")]
    MetadataParse {
        /// Rule file name
        file: String,
        /// 1-based line number where the problem was detected
        line: usize,
        /// Failure reason
        reason: String,
    },

    /// Malformed section manifest
    #[error("Manifest error: {reason}")]
    ManifestParse {
        /// Failure reason
        reason: String,
    },

    /// Rule file whose name matches no manifest section
    #[error("Rule file '{file}' matches no section prefix in the manifest")]
    UnknownSection {
        /// Rule file name
        file: String,
    },

    /// One or more structural checks failed after assembly
    #[error("Structural validation failed ({failures} check(s)):\n{report}")]
    StructuralValidation {
        /// Number of failed checks
        failures: usize,
        /// Full report, passing checks included
        report: ValidationReport,
    },

    /// Missing or unreadable input, or a failed output write
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Broad classes of failure, used to pick a process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Metadata, manifest or section resolution failed before assembly
    Parse,
    /// Assembled output violated structural invariants
    Validation,
    /// Filesystem failure
    Io,
}

impl CompileError {
    /// Build an I/O error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a manifest error from any message
    pub fn manifest(reason: impl Into<String>) -> Self {
        CompileError::ManifestParse {
            reason: reason.into(),
        }
    }

    /// Which class of failure this is
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompileError::MetadataParse { .. }
            | CompileError::ManifestParse { .. }
            | CompileError::UnknownSection { .. } => ErrorCategory::Parse,
            CompileError::StructuralValidation { .. } => ErrorCategory::Validation,
            CompileError::Io { .. } => ErrorCategory::Io,
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;
