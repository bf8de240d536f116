//! Process exit codes
//!
//! - **0**: compiled, validated and written (or up to date with `--check`)
//! - **1**: structural validation failed; nothing written
//! - **2**: bad arguments or configuration
//! - **3**: a rule file or the manifest could not be parsed, or a rule matched no section
//! - **4**: an input could not be read or the output could not be written
//! - **5**: `--check` found the output missing or stale

use rulebook_compiler::{CompileError, ErrorCategory};

pub mod codes {
    pub const SUCCESS: u8 = 0;
    pub const VALIDATION_FAILED: u8 = 1;
    pub const USAGE_ERROR: u8 = 2;
    pub const PARSE_ERROR: u8 = 3;
    pub const IO_ERROR: u8 = 4;
    pub const OUT_OF_DATE: u8 = 5;
}

/// Exit code for a compiler error
pub fn for_error(err: &CompileError) -> u8 {
    match err.category() {
        ErrorCategory::Parse => codes::PARSE_ERROR,
        ErrorCategory::Validation => codes::VALIDATION_FAILED,
        ErrorCategory::Io => codes::IO_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failures_are_distinct_from_validation() {
        let parse = for_error(&CompileError::UnknownSection {
            file: "misc.md".into(),
        });
        let io = for_error(&CompileError::io("x", std::io::Error::other("denied")));
        assert_eq!(parse, codes::PARSE_ERROR);
        assert_eq!(io, codes::IO_ERROR);
        assert_ne!(parse, codes::VALIDATION_FAILED);
        assert_ne!(parse, codes::SUCCESS);
    }
}
