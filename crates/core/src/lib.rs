//! svntopo core library.
//!
//! This crate infers branch/merge topology from a flat, already-collected
//! SVN history: per-revision branch ownership, spurious-revision detection
//! with re-parenting, and merge-source resolution reconciling explicit merge
//! metadata with content-identity evidence through a branch-range interval
//! algebra.

pub mod analyzer;
pub mod branch;
pub mod config;
pub mod errors;
pub mod filemap;
pub mod input;
pub mod lookup;
pub mod models;
pub mod range;

// Re-exports for convenience.
pub use analyzer::{analyze, RevisionAnalyzer};
pub use config::AppConfig;
pub use models::{AnalysisReport, Directive, HistoryDump};
pub use range::BranchRange;
