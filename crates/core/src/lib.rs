//! Domain logic for the file revisioning and path-templating engine.
//!
//! Everything here is free of database access: the entity hierarchy arena,
//! file-tree templates and path resolution, breakdown naming, and revision
//! keys. Persistence lives in `kinetrack_db`; orchestration in
//! `kinetrack_pipeline`.

pub mod breakdown;
pub mod error;
pub mod file_tree;
pub mod hierarchy;
pub mod revision;
pub mod types;
