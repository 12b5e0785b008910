//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Console output on stderr (pretty or JSON)
//! - Optional JSON log file through tracing-appender

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat};
pub use logger::{LoggerImpl, LOG_FILE_NAME};
