//! Rulebook Types - Core types for the rulebook compiler
//!
//! This module defines the data model shared by the compiler and the CLI:
//! parsed rule files, manifest sections, and the compiled document.

pub mod document;
pub mod impact;
pub mod rule;
pub mod section;

pub use document::{CompiledDocument, DocumentInfo, RenderedDocument, RuleSpan, TocEntry, TocLevel};
pub use impact::{ImpactLevel, ImpactLevelError};
pub use rule::{RuleMetadata, RuleRecord};
pub use section::{ResolvedSection, SectionDescriptor};
