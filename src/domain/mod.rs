//! Domain layer for the large-file handler
//!
//! This module contains the data model, typed errors and the strategy port.

pub mod error;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use error::{ApplyError, PhaseError};
pub use ports::Strategy;
