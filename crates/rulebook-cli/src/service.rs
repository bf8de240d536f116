use crate::config::Config;
use crate::exit_codes::{self, codes};
use anyhow::Context;
use rulebook_compiler::{compile, is_up_to_date, write_atomic, Compilation};
use tracing::{error, info, warn};

/// How the compiled document is handled once it validates
#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    /// Compare with the existing output instead of writing
    pub check: bool,
    /// Print the validation report as JSON on stdout
    pub json: bool,
}

/// One compilation run
pub struct CompileService {
    config: Config,
    mode: RunMode,
}

impl CompileService {
    /// Create a new compile service
    pub fn new(config: Config, mode: RunMode) -> Self {
        Self { config, mode }
    }

    /// Run the compile, returning the process exit code
    pub fn run(&self) -> u8 {
        let logging = &self.config.logging;
        if let Err(e) = rulebook_logging::init_logging(&logging.level, logging.format) {
            eprintln!("warning: logging not initialised: {e}");
        }

        let paths = &self.config.paths;
        info!(
            "Compiling rules from {:?} with manifest {:?} (divider policy: {})",
            paths.rules_dir, paths.manifest, self.config.compile.divider_policy
        );

        let options = self.config.compile.assembler_options();
        let compilation = match compile(&paths.rules_dir, &paths.manifest, &options) {
            Ok(compilation) => compilation,
            Err(e) => {
                error!("Compilation aborted: {}", e);
                eprintln!("error: {e}");
                return exit_codes::for_error(&e);
            }
        };

        if self.mode.json {
            if let Err(e) = self.print_json(&compilation) {
                eprintln!("error: {e:#}");
                return codes::IO_ERROR;
            }
        }

        if !compilation.report.passed() {
            let failures = compilation.report.failures().count();
            eprintln!(
                "Structural validation failed ({failures} check(s)); {:?} was not written:\n{}",
                paths.output, compilation.report
            );
            return codes::VALIDATION_FAILED;
        }

        if self.mode.check {
            return self.check_output(&compilation);
        }

        match write_atomic(&paths.output, compilation.rendered.text.as_bytes()) {
            Ok(()) => {
                info!("Wrote {:?}", paths.output);
                println!(
                    "Compiled {} rules in {} sections into {}",
                    compilation.document.rule_count(),
                    compilation.document.section_count(),
                    paths.output.display()
                );
                codes::SUCCESS
            }
            Err(e) => {
                error!("Write failed: {}", e);
                eprintln!("error: {e}");
                exit_codes::for_error(&e)
            }
        }
    }

    fn print_json(&self, compilation: &Compilation) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&compilation.report)
            .context("Failed to serialize validation report")?;
        println!("{json}");
        Ok(())
    }

    fn check_output(&self, compilation: &Compilation) -> u8 {
        let output = &self.config.paths.output;
        match is_up_to_date(output, compilation.rendered.text.as_bytes()) {
            Ok(true) => {
                info!("{:?} is up to date", output);
                codes::SUCCESS
            }
            Ok(false) => {
                warn!("{:?} is missing or stale", output);
                eprintln!(
                    "{} is out of date; rerun without --check to regenerate it",
                    output.display()
                );
                codes::OUT_OF_DATE
            }
            Err(e) => {
                eprintln!("error: {e}");
                exit_codes::for_error(&e)
            }
        }
    }
}
