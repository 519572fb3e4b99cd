// Batch module
//
// - orchestrator.rs: BatchOrchestrator, the per-run driver
// - summary.rs: per-file outcomes and the run summary

pub mod orchestrator;
pub mod summary;

pub use orchestrator::BatchOrchestrator;
pub use summary::{FileOutcome, FileStatus, RunSummary};
