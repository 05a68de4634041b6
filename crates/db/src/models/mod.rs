//! Row models and DTOs, one module per table.

pub mod asset_instance;
pub mod entity;
pub mod output_file;
pub mod output_type;
pub mod person;
pub mod software;
pub mod status;
pub mod task;
pub mod working_file;
