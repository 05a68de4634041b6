//! Working file revision model and DTOs.

use kinetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `working_files` table. Rows are never deleted and their
/// revision and location never change.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkingFile {
    pub id: DbId,
    pub task_id: DbId,
    pub entity_id: DbId,
    pub person_id: DbId,
    pub software_id: DbId,
    pub name: String,
    pub revision: i32,
    pub variant_key: String,
    pub comment: Option<String>,
    pub file_status_id: StatusId,
    pub path: String,
    pub file_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkingFile {
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
pub struct NewWorkingFile {
    pub task_id: DbId,
    pub entity_id: DbId,
    pub person_id: DbId,
    pub software_id: DbId,
    pub name: String,
    pub revision: i32,
    pub variant_key: String,
    pub comment: Option<String>,
    pub path: String,
    pub file_name: String,
}

/// DTO for updating the mutable fields of a working file. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorkingFile {
    pub comment: Option<String>,
    pub file_status_id: Option<StatusId>,
}
