//! Repository for the `tasks` table.

use kinetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task};

const COLUMNS: &str = "id, project_id, entity_id, task_type_id, name, created_at, updated_at";

pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task. Fails on `uq_tasks_entity_task_type` when the entity
    /// already has a task of this type.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (project_id, entity_id, task_type_id, name)
             VALUES ($1, $2, $3, COALESCE($4, 'main'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(input.entity_id)
            .bind(input.task_type_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the tasks attached to an entity, oldest first.
    pub async fn list_by_entity(pool: &PgPool, entity_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE entity_id = $1 ORDER BY id");
        sqlx::query_as::<_, Task>(&query)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }
}
