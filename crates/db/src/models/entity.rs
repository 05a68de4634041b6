//! Entity hierarchy model and DTOs.

use kinetrack_core::error::CoreError;
use kinetrack_core::hierarchy::{EntityNode, EntityType};
use kinetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `entities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Entity {
    pub id: DbId,
    pub project_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub entity_type: String,
    pub name: String,
    pub file_tree: Option<String>,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Entity {
    pub fn kind(&self) -> Result<EntityType, CoreError> {
        EntityType::from_name(&self.entity_type)
    }

    /// Id of the project this entity belongs to; a project is its own.
    pub fn root_project_id(&self) -> DbId {
        self.project_id.unwrap_or(self.id)
    }

    pub fn to_node(&self) -> Result<EntityNode, CoreError> {
        Ok(EntityNode {
            id: self.id,
            name: self.name.clone(),
            entity_type: self.kind()?,
            parent_id: self.parent_id,
            project_id: self.root_project_id(),
        })
    }
}

/// DTO for creating a project row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub file_tree: String,
    pub data: Option<serde_json::Value>,
}

/// DTO for creating a non-project entity. Parent rules are checked by the
/// caller before insert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntity {
    pub project_id: DbId,
    pub parent_id: DbId,
    pub entity_type: EntityType,
    pub name: String,
    pub data: Option<serde_json::Value>,
}
