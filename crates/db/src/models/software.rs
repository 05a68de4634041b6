//! Software catalog model.

use kinetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `software` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Software {
    pub id: DbId,
    pub name: String,
    pub short_name: String,
    pub file_extension: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSoftware {
    pub name: String,
    pub short_name: Option<String>,
    pub file_extension: String,
}
