//! Breakdown asset instance model.

use kinetrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `asset_instances` table.
///
/// `removed_at` marks an instance taken out of the breakdown. Its number
/// stays reserved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetInstance {
    pub id: DbId,
    pub asset_id: DbId,
    pub target_entity_id: DbId,
    pub target_entity_type: String,
    pub number: i32,
    pub description: Option<String>,
    pub removed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AssetInstance {
    pub fn is_active(&self) -> bool {
        self.removed_at.is_none()
    }
}

/// Insert parameters once a number has been allocated.
#[derive(Debug, Clone)]
pub struct NewAssetInstance {
    pub asset_id: DbId,
    pub target_entity_id: DbId,
    pub target_entity_type: String,
    pub number: i32,
    pub description: Option<String>,
}
