//! Rule directory scanning

use crate::error::{CompileError, Result};
use crate::frontmatter::parse_rule;
use rulebook_types::RuleRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-name prefix for templates and notes that are not rules
const SKIP_PREFIX: char = '_';

fn is_rule_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file()
        && !name.starts_with(SKIP_PREFIX)
        && path.extension().is_some_and(|ext| ext == "md")
}

/// Rule file paths in `dir`, sorted by file name
pub fn rule_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| CompileError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CompileError::io(dir, e))?.path();
        if is_rule_file(&path) {
            paths.push(path);
        } else {
            debug!("Skipping {:?}", path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Read and parse every rule file in `dir`
///
/// Any file that fails to parse aborts the load; partial corpora are never
/// returned.
pub fn load_rules(dir: &Path) -> Result<Vec<RuleRecord>> {
    let paths = rule_paths(dir)?;

    let mut rules = Vec::with_capacity(paths.len());
    for path in paths {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = fs::read_to_string(&path).map_err(|e| CompileError::io(&path, e))?;
        let rule = parse_rule(&file, &text)?;
        debug!("Parsed rule '{}' from {}", rule.title, file);
        rules.push(rule);
    }

    info!("Loaded {} rule files from {:?}", rules.len(), dir);
    Ok(rules)
}
