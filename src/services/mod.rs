pub mod activation;
pub mod backup_store;
pub mod controller;
pub mod diff_engine;
pub mod direct;
pub mod final_fallback;
pub mod performance;
pub mod strategies;
pub mod structure;

pub use activation::{ActivationDetector, FileStats};
pub use backup_store::BackupStore;
pub use controller::DegradationController;
pub use direct::apply_direct;
pub use final_fallback::final_fallback;
pub use performance::{OutcomeRecord, PerformanceMonitor, PerformanceSummary};
