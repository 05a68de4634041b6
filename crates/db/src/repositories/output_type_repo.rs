//! Repository for the `output_types` table.

use kinetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::output_type::{CreateOutputType, OutputType};

const COLUMNS: &str = "id, name, short_name, created_at, updated_at";

pub struct OutputTypeRepo;

impl OutputTypeRepo {
    pub async fn create(pool: &PgPool, input: &CreateOutputType) -> Result<OutputType, sqlx::Error> {
        let query = format!(
            "INSERT INTO output_types (name, short_name)
             VALUES ($1, COALESCE($2, ''))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutputType>(&query)
            .bind(&input.name)
            .bind(&input.short_name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OutputType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM output_types WHERE id = $1");
        sqlx::query_as::<_, OutputType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
