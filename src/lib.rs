//! Largefile - graceful degradation for edits to large files
//!
//! When a requested write targets a file too large to rewrite safely in one
//! pass, the [`DegradationController`] walks an ordered chain of fallback
//! strategies until one lands the edit:
//!
//! - **four_phase**: analyze, back up, write, verify
//! - **chunked_application**: write the delta in line chunks with rollback
//! - **diff_incremental**: apply unified-diff hunks one at a time
//! - **context_scoped**: replace only the top-level sections that changed
//! - **script_generation**: emit a reviewable Python script that performs the write
//!
//! If every strategy fails, a manual modification report is produced next to
//! the target file.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the [`Strategy`] port
//! - **Service Layer** (`services`): detection, strategies and the controller
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use largefile::{Config, DegradationController};
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = DegradationController::new(Config::default());
//!     let outcome = controller
//!         .execute("edit", "big.py".as_ref(), Some(new_text))
//!         .await;
//!     println!("{}", outcome.strategy);
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::models::{
    Config, LoggingConfig, OperationKind, OperationRequest, OutcomeDetails, StrategyKind,
    StrategyOutcome,
};
pub use domain::{ApplyError, PhaseError, Strategy};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ActivationDetector, DegradationController, PerformanceMonitor};
