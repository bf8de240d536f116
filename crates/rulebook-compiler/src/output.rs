//! Writing the compiled document

use crate::error::{CompileError, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Write `data` to `path` so that no reader ever sees a partial file
///
/// The bytes go to a temporary file in the destination directory, are
/// flushed and synced, and the temporary file is then renamed over `path`.
/// On any failure the temporary file is removed and `path` is untouched.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| CompileError::io(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| CompileError::io(parent, e))?;
    tmp.write_all(data).map_err(|e| CompileError::io(tmp.path(), e))?;
    tmp.flush().map_err(|e| CompileError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CompileError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| CompileError::io(path, e.error))?;

    Ok(())
}

/// Whether `path` already holds exactly `data`; a missing file is not up to date
pub fn is_up_to_date(path: &Path, data: &[u8]) -> Result<bool> {
    match fs::read(path) {
        Ok(existing) => Ok(existing == data),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CompileError::io(path, e)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("AGENTS.md");

        write_atomic(&path, b"first\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");

        write_atomic(&path, b"second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");

        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_is_up_to_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AGENTS.md");
        assert!(!is_up_to_date(&path, b"x").unwrap());

        fs::write(&path, b"x").unwrap();
        assert!(is_up_to_date(&path, b"x").unwrap());
        assert!(!is_up_to_date(&path, b"y").unwrap());
    }
}
