mod cli;
mod config;
mod exit_codes;
mod service;

use clap::Parser;
use cli::Cli;
use config::Config;
use exit_codes::codes;
use service::{CompileService, RunMode};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config.with_cli_overrides(&cli),
        Err(e) => {
            eprintln!("error: failed to load configuration: {e:#}");
            return ExitCode::from(codes::USAGE_ERROR);
        }
    };

    let mode = RunMode {
        check: cli.check,
        json: cli.json,
    };
    ExitCode::from(CompileService::new(config, mode).run())
}
