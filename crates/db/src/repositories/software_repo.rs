//! Repository for the `software` table.

use kinetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::software::{CreateSoftware, Software};

const COLUMNS: &str = "id, name, short_name, file_extension, created_at, updated_at";

pub struct SoftwareRepo;

impl SoftwareRepo {
    pub async fn create(pool: &PgPool, input: &CreateSoftware) -> Result<Software, sqlx::Error> {
        let query = format!(
            "INSERT INTO software (name, short_name, file_extension)
             VALUES ($1, COALESCE($2, ''), $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Software>(&query)
            .bind(&input.name)
            .bind(&input.short_name)
            .bind(&input.file_extension)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Software>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM software WHERE id = $1");
        sqlx::query_as::<_, Software>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
