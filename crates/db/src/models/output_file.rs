//! Output file revision model and DTOs.

use kinetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `output_files` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutputFile {
    pub id: DbId,
    pub task_id: DbId,
    pub entity_id: DbId,
    pub person_id: DbId,
    pub output_type_id: DbId,
    pub asset_instance_id: Option<DbId>,
    pub source_file_id: Option<DbId>,
    pub name: String,
    pub representation: Option<String>,
    pub revision: i32,
    pub variant_key: String,
    pub comment: Option<String>,
    pub file_status_id: StatusId,
    pub path: String,
    pub file_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OutputFile {
    pub fn full_path(&self) -> String {
        if self.path.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.path, self.file_name)
        }
    }
}

/// Insert parameters once revision and location are known.
#[derive(Debug, Clone)]
pub struct NewOutputFile {
    pub task_id: DbId,
    pub entity_id: DbId,
    pub person_id: DbId,
    pub output_type_id: DbId,
    pub asset_instance_id: Option<DbId>,
    pub source_file_id: Option<DbId>,
    pub name: String,
    pub representation: Option<String>,
    pub revision: i32,
    pub variant_key: String,
    pub comment: Option<String>,
    pub path: String,
    pub file_name: String,
}

/// DTO for updating the mutable fields of an output file. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOutputFile {
    pub comment: Option<String>,
    pub file_status_id: Option<StatusId>,
}
