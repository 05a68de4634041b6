//! Repository for the `persons` table.

use kinetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::person::{CreatePerson, Person};

const COLUMNS: &str = "id, first_name, last_name, email, created_at, updated_at";

pub struct PersonRepo;

impl PersonRepo {
    pub async fn create(pool: &PgPool, input: &CreatePerson) -> Result<Person, sqlx::Error> {
        let query = format!(
            "INSERT INTO persons (first_name, last_name, email)
             VALUES ($1, COALESCE($2, ''), $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM persons WHERE id = $1");
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
