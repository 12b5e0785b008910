use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::outcome::StrategyKind;

/// Main configuration structure for the large-file handler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Line count above which high-risk operations take the fallback chain
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Lines per chunk, and the added-line threshold for chunking at all
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Reserved
    #[serde(default = "default_overlap_lines")]
    pub overlap_lines: usize,

    /// Reserved
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    /// Run generated scripts without review (also settable per strategy)
    #[serde(default)]
    pub auto_execute: bool,

    /// Per-strategy switches and tuning
    #[serde(default)]
    pub strategies: StrategiesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_max_lines() -> usize {
    500
}

const fn default_chunk_size() -> usize {
    200
}

const fn default_overlap_lines() -> usize {
    10
}

const fn default_context_lines() -> usize {
    50
}

const fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            chunk_size: default_chunk_size(),
            overlap_lines: default_overlap_lines(),
            context_lines: default_context_lines(),
            auto_execute: false,
            strategies: StrategiesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Whether the given chain strategy should run
    pub const fn is_enabled(&self, kind: StrategyKind) -> bool {
        match kind {
            StrategyKind::FourPhase => self.strategies.four_phase.enabled,
            StrategyKind::ChunkedApplication => self.strategies.chunked_application.enabled,
            StrategyKind::DiffIncremental => self.strategies.diff_incremental.enabled,
            StrategyKind::ContextScoped => self.strategies.context_scoped.enabled,
            StrategyKind::ScriptGeneration => self.strategies.script_generation.enabled,
            StrategyKind::DirectOperation | StrategyKind::FinalFallback => true,
        }
    }

    /// Chunk size used by chunked application
    pub fn effective_chunk_size(&self) -> usize {
        self.strategies
            .chunked_application
            .chunk_size
            .unwrap_or(self.chunk_size)
    }

    /// Generated scripts run automatically if either switch is on
    pub const fn script_auto_execute(&self) -> bool {
        self.auto_execute || self.strategies.script_generation.auto_execute
    }
}

/// Switches and tuning for each fallback strategy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StrategiesConfig {
    #[serde(default)]
    pub four_phase: FourPhaseConfig,

    #[serde(default)]
    pub chunked_application: ChunkedApplicationConfig,

    #[serde(default)]
    pub diff_incremental: DiffIncrementalConfig,

    #[serde(default)]
    pub context_scoped: ContextScopedConfig,

    #[serde(default)]
    pub script_generation: ScriptGenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FourPhaseConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Reserved
    #[serde(default = "default_four_phase_timeout")]
    pub timeout_secs: u64,
}

const fn default_four_phase_timeout() -> u64 {
    30
}

impl Default for FourPhaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_four_phase_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChunkedApplicationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Overrides the top-level `chunk_size` when set
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

impl Default for ChunkedApplicationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chunk_size: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiffIncrementalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Reserved
    #[serde(default = "default_max_operations")]
    pub max_operations: usize,
}

const fn default_max_operations() -> usize {
    50
}

impl Default for DiffIncrementalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_operations: default_max_operations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextScopedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Reserved
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

impl Default for ContextScopedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            context_lines: default_context_lines(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScriptGenerationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub auto_execute: bool,

    /// Upper bound on a script run before it is killed
    #[serde(default = "default_script_timeout")]
    pub timeout_secs: u64,

    /// Program used to run the generated script
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

const fn default_script_timeout() -> u64 {
    60
}

fn default_interpreter() -> String {
    "python3".to_string()
}

impl Default for ScriptGenerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_execute: false,
            timeout_secs: default_script_timeout(),
            interpreter: default_interpreter(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for `largefile.log`; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_lines, 500);
        assert_eq!(config.chunk_size, 200);
        assert_eq!(config.overlap_lines, 10);
        assert_eq!(config.context_lines, 50);
        assert!(!config.auto_execute);
        assert_eq!(config.strategies.script_generation.timeout_secs, 60);
        for kind in StrategyKind::CHAIN {
            assert!(config.is_enabled(kind));
        }
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r"
max_lines: 800
strategies:
  chunked_application:
    enabled: false
    chunk_size: 50
  script_generation:
    auto_execute: true
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.max_lines, 800);
        assert_eq!(config.chunk_size, 200);
        assert!(!config.is_enabled(StrategyKind::ChunkedApplication));
        assert!(config.is_enabled(StrategyKind::FourPhase));
        assert_eq!(config.effective_chunk_size(), 50);
        assert!(config.script_auto_execute());
        assert_eq!(config.strategies.script_generation.interpreter, "python3");
    }
}
