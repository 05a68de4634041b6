//! Task type and task models.

use kinetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `task_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskType {
    pub id: DbId,
    pub name: String,
    pub short_name: String,
    pub for_entity: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskType {
    pub name: String,
    pub short_name: Option<String>,
    pub for_entity: Option<String>,
}

/// A row from the `tasks` table. One task per (entity, task type).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub entity_id: DbId,
    pub task_type_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub project_id: DbId,
    pub entity_id: DbId,
    pub task_type_id: DbId,
    pub name: Option<String>,
}
