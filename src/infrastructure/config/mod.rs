//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading (`large_file_handler` section)
//! - Environment variable overrides
//! - Configuration validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
