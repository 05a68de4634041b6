//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Methods that must share a transaction with
//! the caller take `&mut PgConnection` instead.

pub mod asset_instance_repo;
pub mod entity_repo;
pub mod output_file_repo;
pub mod output_type_repo;
pub mod person_repo;
pub mod revision_counter_repo;
pub mod software_repo;
pub mod task_repo;
pub mod task_type_repo;
pub mod working_file_repo;

pub use asset_instance_repo::AssetInstanceRepo;
pub use entity_repo::EntityRepo;
pub use output_file_repo::OutputFileRepo;
pub use output_type_repo::OutputTypeRepo;
pub use person_repo::PersonRepo;
pub use revision_counter_repo::RevisionCounterRepo;
pub use software_repo::SoftwareRepo;
pub use task_repo::TaskRepo;
pub use task_type_repo::TaskTypeRepo;
pub use working_file_repo::WorkingFileRepo;
