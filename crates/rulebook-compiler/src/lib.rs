//! Rulebook compiler
//!
//! Turns a directory of independently authored rule files into one ordered
//! markdown document and proves the result is structurally sound.
//!
//! ## Pipeline
//!
//! 1. Metadata parsing: split each rule file into metadata and a verbatim body
//! 2. Section index: load the manifest and assign every rule to one section
//! 3. Assembly: order sections and rules, build the TOC, splice bodies
//! 4. Validation: re-scan the rendered text against a fixed checklist
//!
//! Parse-time failures abort the run. Validation failures are collected
//! into one [`ValidationReport`].

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod assembler;
pub mod divider;
pub mod error;
pub mod frontmatter;
pub mod loader;
pub mod manifest;
pub mod output;
pub mod scan;
pub mod slug;
pub mod validator;

pub use assembler::{Assembler, AssemblerOptions};
pub use divider::{check_divider, DividerError, DividerPlan, DividerPolicy, DEFAULT_DIVIDER};
pub use error::{CompileError, ErrorCategory, Result};
pub use frontmatter::{parse_rule, split_frontmatter, METADATA_DELIMITER};
pub use loader::load_rules;
pub use manifest::SectionIndex;
pub use output::{is_up_to_date, write_atomic};
pub use slug::slugify;
pub use validator::{CheckResult, ValidationReport, Validator};

use rulebook_types::{CompiledDocument, RenderedDocument, RuleRecord};
use std::path::Path;
use tracing::{info, warn};

/// Everything one compilation run produced
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Assembled document
    pub document: CompiledDocument,
    /// Rendered markdown and its bookkeeping
    pub rendered: RenderedDocument,
    /// Structural checklist outcome
    pub report: ValidationReport,
}

impl Compilation {
    /// Fail with [`CompileError::StructuralValidation`] unless every check passed
    pub fn ensure_valid(&self) -> Result<()> {
        self.report.clone().into_result().map(|_| ())
    }
}

/// Assemble, render and validate already-loaded rules
pub fn compile_rules(
    index: &SectionIndex,
    rules: Vec<RuleRecord>,
    options: &AssemblerOptions,
) -> Result<Compilation> {
    let sections = index.assign(rules)?;

    let assembler = Assembler::new(options.clone());
    let document = assembler.assemble(index.document(), sections);
    let rendered = assembler.render(&document);
    let report = Validator::new(options).validate(&rendered, &document.rules_per_section());

    info!(
        "Compiled {} rules in {} sections ({} bytes)",
        document.rule_count(),
        document.section_count(),
        rendered.text.len()
    );
    for failure in report.failures() {
        warn!("Check '{}' failed: {}", failure.name, failure.detail);
    }

    Ok(Compilation {
        document,
        rendered,
        report,
    })
}

/// Load the manifest and rule directory, then compile
///
/// The manifest is read first so a malformed manifest aborts before any
/// rule file is touched.
pub fn compile(rules_dir: &Path, manifest: &Path, options: &AssemblerOptions) -> Result<Compilation> {
    let index = SectionIndex::load(manifest)?;
    let rules = load_rules(rules_dir)?;
    compile_rules(&index, rules, options)
}

/// Compile and, only if every check passes, write the output atomically
pub fn compile_to_file(
    rules_dir: &Path,
    manifest: &Path,
    output: &Path,
    options: &AssemblerOptions,
) -> Result<Compilation> {
    let compilation = compile(rules_dir, manifest, options)?;
    compilation.ensure_valid()?;
    write_atomic(output, compilation.rendered.text.as_bytes())?;
    info!("Wrote {:?}", output);
    Ok(compilation)
}
