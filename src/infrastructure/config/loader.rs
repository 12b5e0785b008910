use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::domain::models::config::Config;

/// Key under which handler settings live in a YAML file
pub const CONFIG_SECTION: &str = "large_file_handler";

pub const ENV_PREFIX: &str = "LARGEFILE_";

const PROJECT_CONFIG: &str = ".largefile/config.yaml";
const LOCAL_CONFIG: &str = ".largefile/local.yaml";

/// Strategy keys written by earlier tooling, with their current names
const LEGACY_STRATEGY_KEYS: [(&str, &str); 5] = [
    ("four_step_anti_loop", "four_phase"),
    ("chunk_processing", "chunked_application"),
    ("incremental_edit", "diff_incremental"),
    ("context_optimization", "context_scoped"),
    ("script_assist", "script_generation"),
];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_lines: {0}. Must be at least 1")]
    InvalidMaxLines(usize),

    #[error("Invalid chunk_size: {0}. Must be at least 1")]
    InvalidChunkSize(usize),

    #[error("Invalid script timeout: {0}s. Must be at least 1")]
    InvalidScriptTimeout(u64),

    #[error("Script interpreter cannot be empty")]
    EmptyInterpreter,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .largefile/config.yaml (project config)
    /// 3. .largefile/local.yaml (local overrides, optional)
    /// 4. Environment variables (LARGEFILE_* prefix, `__` separates nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment(&[Path::new(PROJECT_CONFIG), Path::new(LOCAL_CONFIG)])?
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment
    /// overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Self::figment(&[path])?
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Defaults, then each YAML file's `large_file_handler` section in order,
    /// then the environment. Missing files are skipped.
    fn figment(files: &[&Path]) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        for file in files {
            if !file.exists() {
                continue;
            }
            let raw = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read config {}", file.display()))?;
            let normalized = normalize_legacy_keys(&raw)
                .with_context(|| format!("Failed to parse config {}", file.display()))?;
            if let Some(text) = normalized {
                figment = figment.merge(Figment::from(Yaml::string(&text)).focus(CONFIG_SECTION));
            }
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.max_lines == 0 {
            return Err(ConfigError::InvalidMaxLines(config.max_lines));
        }

        let chunk_size = config.effective_chunk_size();
        if chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(chunk_size));
        }

        let script = &config.strategies.script_generation;
        if script.timeout_secs == 0 {
            return Err(ConfigError::InvalidScriptTimeout(script.timeout_secs));
        }
        if script.interpreter.trim().is_empty() {
            return Err(ConfigError::EmptyInterpreter);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

/// Rename strategy tables (and the four-phase `timeout`) written by earlier
/// tooling. A current name already present wins over its legacy twin.
///
/// Returns `None` for a document that is not a mapping, such as an empty file.
fn normalize_legacy_keys(raw: &str) -> Result<Option<String>, serde_yaml::Error> {
    let mut doc: Value = serde_yaml::from_str(raw)?;
    if !doc.is_mapping() {
        return Ok(None);
    }

    if let Some(strategies) = doc
        .get_mut(CONFIG_SECTION)
        .and_then(|section| section.get_mut("strategies"))
        .and_then(Value::as_mapping_mut)
    {
        for (legacy, current) in LEGACY_STRATEGY_KEYS {
            rename_key(strategies, legacy, current);
        }
        if let Some(four_phase) = strategies
            .get_mut("four_phase")
            .and_then(Value::as_mapping_mut)
        {
            rename_key(four_phase, "timeout", "timeout_secs");
        }
    }

    serde_yaml::to_string(&doc).map(Some)
}

fn rename_key(table: &mut Mapping, legacy: &str, current: &str) {
    let Some(value) = table.remove(legacy) else {
        return;
    };
    if table.contains_key(current) {
        warn!(legacy, current, "Ignoring legacy config key shadowed by its current name");
    } else {
        table.insert(Value::from(current), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const OVERRIDE_VARS: [&str; 3] = [
        "LARGEFILE_MAX_LINES",
        "LARGEFILE_STRATEGIES__SCRIPT_GENERATION__TIMEOUT_SECS",
        "LARGEFILE_LOGGING__LEVEL",
    ];

    /// Run `f` with no overrides in the environment
    fn without_overrides(f: impl FnOnce()) {
        temp_env::with_vars_unset(OVERRIDE_VARS, f);
    }

    fn yaml_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{body}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.max_lines, 500);
        assert_eq!(config.chunk_size, 200);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_load_from_file_reads_section() {
        let file = yaml_file(
            "large_file_handler:
  max_lines: 800
  auto_execute: true
  strategies:
    four_phase:
      enabled: false
    chunked_application:
      chunk_size: 120
unrelated_tool:
  max_lines: 1
",
        );

        without_overrides(|| {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();

            assert_eq!(config.max_lines, 800);
            assert!(config.auto_execute);
            assert!(!config.strategies.four_phase.enabled);
            assert!(config.strategies.chunked_application.enabled);
            assert_eq!(config.effective_chunk_size(), 120);
            assert_eq!(config.chunk_size, 200, "untouched keys keep defaults");
        });
    }

    #[test]
    fn test_legacy_strategy_keys_are_honored() {
        let file = yaml_file(
            "large_file_handler:
  max_lines: 300
  strategies:
    four_step_anti_loop:
      enabled: false
      timeout: 45
    chunk_processing:
      chunk_size: 80
    incremental_edit:
      enabled: false
      max_operations: 10
    context_optimization:
      context_lines: 12
    script_assist:
      enabled: true
      auto_execute: true
",
        );

        without_overrides(|| {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();

            assert_eq!(config.max_lines, 300);
            assert!(!config.strategies.four_phase.enabled);
            assert_eq!(config.strategies.four_phase.timeout_secs, 45);
            assert_eq!(config.effective_chunk_size(), 80);
            assert!(!config.strategies.diff_incremental.enabled);
            assert_eq!(config.strategies.diff_incremental.max_operations, 10);
            assert_eq!(config.strategies.context_scoped.context_lines, 12);
            assert!(config.script_auto_execute());
        });
    }

    #[test]
    fn test_current_key_wins_over_legacy_twin() {
        let file = yaml_file(
            "large_file_handler:
  strategies:
    four_phase:
      enabled: true
    four_step_anti_loop:
      enabled: false
",
        );

        without_overrides(|| {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();
            assert!(config.strategies.four_phase.enabled);
        });
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let file = yaml_file("");
        without_overrides(|| {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();
            assert_eq!(config.max_lines, 500);
        });
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let file = yaml_file("large_file_handler: [unclosed\n");
        without_overrides(|| {
            let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
            assert!(format!("{err:#}").contains("Failed to parse config"));
        });
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        without_overrides(|| {
            let config = ConfigLoader::load_from_file(dir.path().join("absent.yaml")).unwrap();
            assert_eq!(config.max_lines, 500);
        });
    }

    #[test]
    fn test_env_override() {
        let file = yaml_file("large_file_handler:\n  max_lines: 800\n");

        temp_env::with_vars(
            [
                ("LARGEFILE_MAX_LINES", Some("42")),
                ("LARGEFILE_STRATEGIES__SCRIPT_GENERATION__TIMEOUT_SECS", Some("5")),
                ("LARGEFILE_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.max_lines, 42, "env should win over file");
                assert_eq!(config.strategies.script_generation.timeout_secs, 5);
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        let base = yaml_file(
            "large_file_handler:\n  max_lines: 600\n  logging:\n    level: info\n    format: json\n",
        );
        let local = yaml_file("large_file_handler:\n  max_lines: 700\n  logging:\n    level: warn\n");

        without_overrides(|| {
            let config: Config = ConfigLoader::figment(&[base.path(), local.path()])
                .unwrap()
                .extract()
                .unwrap();

            assert_eq!(config.max_lines, 700, "Override should win");
            assert_eq!(config.logging.level, "warn");
            assert_eq!(
                config.logging.format, "json",
                "Base value should persist when not overridden"
            );
        });
    }

    #[test]
    fn test_validate_zero_max_lines() {
        let config = Config {
            max_lines: 0,
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxLines(0))
        ));
    }

    #[test]
    fn test_validate_zero_chunk_override() {
        let mut config = Config::default();
        config.strategies.chunked_application.chunk_size = Some(0);
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidChunkSize(0))
        ));
    }

    #[test]
    fn test_validate_script_settings() {
        let mut config = Config::default();
        config.strategies.script_generation.timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidScriptTimeout(0))
        ));

        let mut config = Config::default();
        config.strategies.script_generation.interpreter = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyInterpreter)
        ));
    }

    #[test]
    fn test_validate_logging() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        let err = ConfigLoader::validate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid log level: verbose. Must be one of: trace, debug, info, warn, error"
        );

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }
}
