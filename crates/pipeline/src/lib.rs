//! File revisioning engine.
//!
//! [`FileEngine`] ties the pure domain logic in `kinetrack_core` to the
//! PostgreSQL store in `kinetrack_db`: it resolves entity chains, allocates
//! revision and instance numbers inside retried transactions, and computes
//! on-disk paths from each project's file tree template.

pub mod breakdown;
pub mod config;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod paths;
pub mod retry;
pub mod revisions;

pub use config::PipelineConfig;
pub use engine::FileEngine;
pub use error::{PipelineError, PipelineResult};
