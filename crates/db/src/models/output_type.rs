//! Output type catalog model.

use kinetrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `output_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutputType {
    pub id: DbId,
    pub name: String,
    pub short_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOutputType {
    pub name: String,
    pub short_name: Option<String>,
}
