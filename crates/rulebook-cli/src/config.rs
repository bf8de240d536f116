use crate::cli::Cli;
use config::FileFormat;
use rulebook_compiler::{check_divider, AssemblerOptions, DividerPolicy};
use rulebook_logging::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Built-in defaults, the lowest configuration layer
const DEFAULT_CONFIG: &str = r#"
[paths]
rules_dir = "rules"
manifest = "rules/sections.yaml"
output = "AGENTS.md"

[compile]
divider_policy = "between-rules"  # or "within-sections", "between-rules-and-sections"
divider = "***"
toc_rule_entries = true

[logging]
level = "info"  # trace, debug, info, warn, error
format = "text"  # or "json"
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    pub rules_dir: PathBuf,
    pub manifest: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompileConfig {
    pub divider_policy: DividerPolicy,
    pub divider: String,
    pub toc_rule_entries: bool,
}

impl CompileConfig {
    /// Reject settings no corpus could compile under
    pub fn validate(&self) -> anyhow::Result<()> {
        check_divider(&self.divider)
            .map_err(|e| anyhow::anyhow!("invalid [compile] divider: {e}"))
    }

    pub fn assembler_options(&self) -> AssemblerOptions {
        AssemblerOptions {
            divider_policy: self.divider_policy,
            divider: self.divider.clone(),
            toc_rule_entries: self.toc_rule_entries,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub paths: PathsConfig,
    pub compile: CompileConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: ~/.rulebook/rulebook.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".rulebook").join("rulebook.toml"))
    }

    /// Load configuration with layered approach:
    /// 1. Built-in defaults
    /// 2. Global config: ~/.rulebook/rulebook.toml (optional, never created)
    /// 3. Local override: ./rulebook.toml (optional)
    /// 4. File passed with --config (required when given)
    /// 5. Environment variables with RULEBOOK__ prefix
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(global) = Self::global_config_path() {
            config_builder = config_builder.add_source(config::File::from(global).required(false));
        }

        config_builder =
            config_builder.add_source(config::File::with_name("rulebook").required(false));

        if let Some(path) = explicit {
            config_builder = config_builder.add_source(config::File::from(path).required(true));
        }

        let config = config_builder
            .add_source(config::Environment::with_prefix("RULEBOOK").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.compile.validate()?;
        Ok(config)
    }

    /// Apply command-line flags, the highest-priority layer
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.rules_dir {
            self.paths.rules_dir = dir.clone();
        }
        if let Some(manifest) = &cli.manifest {
            self.paths.manifest = manifest.clone();
        }
        if let Some(output) = &cli.output {
            self.paths.output = output.clone();
        }
        if let Some(policy) = cli.divider_policy {
            self.compile.divider_policy = policy;
        }
        if cli.no_rule_toc {
            self.compile.toc_rule_entries = false;
        }
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;

    fn defaults() -> Config {
        toml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }

    #[test]
    fn test_default_config_deserializes() {
        let config = defaults();
        assert_eq!(config.paths.output, PathBuf::from("AGENTS.md"));
        assert_eq!(config.compile.divider_policy, DividerPolicy::BetweenRules);
        assert_eq!(config.compile.assembler_options(), AssemblerOptions::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_policy_names_in_toml() {
        let toml_str = r#"
            [paths]
            rules_dir = "skills/react/rules"
            manifest = "skills/react/sections.yaml"
            output = "skills/react/AGENTS.md"

            [compile]
            divider_policy = "between-rules-and-sections"
            divider = "- - -"
            toc_rule_entries = false

            [logging]
            level = "debug"
            format = "json"
        "#;
        let config: Config = toml::from_str(toml_str).expect("Failed to parse TOML");
        let options = config.compile.assembler_options();
        assert_eq!(options.divider_policy, DividerPolicy::BetweenRulesAndSections);
        assert_eq!(options.divider, "- - -");
        assert!(!options.toc_rule_entries);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    fn with_divider(divider: &str) -> Config {
        let mut config = defaults();
        config.compile.divider = divider.to_string();
        config
    }

    #[test]
    fn test_default_divider_is_valid() {
        assert!(defaults().compile.validate().is_ok());
    }

    #[test]
    fn test_unusable_dividers_are_rejected() {
        for divider in ["", "*** ", " ***", "***\n***", "---", "```", "~~~", "## rule"] {
            let err = with_divider(divider).compile.validate().unwrap_err();
            assert!(err.to_string().contains("invalid [compile] divider"), "{divider:?}: {err}");
        }
    }

    #[test]
    fn test_explicit_config_with_bad_divider_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rulebook.toml");
        std::fs::write(&path, "[compile]\ndivider = \"---\"\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("metadata delimiter"), "{err}");
    }

    #[test]
    fn test_cli_overrides_win() {
        let cli = Cli::try_parse_from([
            "rulebook",
            "--rules-dir",
            "corpus",
            "--output",
            "out/AGENTS.md",
            "--divider-policy",
            "within-sections",
            "--no-rule-toc",
            "--log-level",
            "warn",
        ])
        .unwrap();
        let config = defaults().with_cli_overrides(&cli);
        assert_eq!(config.paths.rules_dir, PathBuf::from("corpus"));
        assert_eq!(config.paths.manifest, PathBuf::from("rules/sections.yaml"));
        assert_eq!(config.paths.output, PathBuf::from("out/AGENTS.md"));
        assert_eq!(config.compile.divider_policy, DividerPolicy::WithinSections);
        assert!(!config.compile.toc_rule_entries);
        assert_eq!(config.logging.level, "warn");
    }
}
