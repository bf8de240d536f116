use clap::Parser;
use rulebook_compiler::DividerPolicy;
use std::path::PathBuf;

/// Compile a directory of rule files into one validated markdown document
#[derive(Debug, Parser)]
#[command(name = "rulebook", version)]
pub struct Cli {
    /// Directory containing the rule files
    #[arg(long)]
    pub rules_dir: Option<PathBuf>,

    /// Section manifest (YAML)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Compiled document to write
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Verify the output is up to date instead of writing it
    #[arg(long, default_value_t = false)]
    pub check: bool,

    /// Print the validation report as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Divider placement: between-rules, within-sections, between-rules-and-sections
    #[arg(long)]
    pub divider_policy: Option<DividerPolicy>,

    /// Leave rules out of the table of contents
    #[arg(long, default_value_t = false)]
    pub no_rule_toc: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    pub log_level: Option<String>,

    /// Extra configuration file, applied over the global and local ones
    #[arg(long)]
    pub config: Option<PathBuf>,
}
