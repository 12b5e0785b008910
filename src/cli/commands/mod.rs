//! CLI command implementations.

pub mod analyze;
pub mod edit;
pub mod stats;
