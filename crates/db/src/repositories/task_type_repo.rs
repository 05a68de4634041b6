//! Repository for the `task_types` table.

use kinetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::{CreateTaskType, TaskType};

const COLUMNS: &str = "id, name, short_name, for_entity, created_at, updated_at";

pub struct TaskTypeRepo;

impl TaskTypeRepo {
    pub async fn create(pool: &PgPool, input: &CreateTaskType) -> Result<TaskType, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_types (name, short_name, for_entity)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, 'shot'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskType>(&query)
            .bind(&input.name)
            .bind(&input.short_name)
            .bind(&input.for_entity)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TaskType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_types WHERE id = $1");
        sqlx::query_as::<_, TaskType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
