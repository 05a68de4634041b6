//! Repository for the `entities` table.

use kinetrack_core::hierarchy::EntityType;
use kinetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::entity::{CreateEntity, CreateProject, Entity};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, parent_id, entity_type, name, file_tree, data, \
    created_at, updated_at";

/// `COLUMNS` qualified with the `e` alias for joins.
const E_COLUMNS: &str = "e.id, e.project_id, e.parent_id, e.entity_type, e.name, e.file_tree, \
    e.data, e.created_at, e.updated_at";

/// Provides hierarchy queries for projects, episodes, sequences, shots,
/// scenes, asset types, and assets.
pub struct EntityRepo;

impl EntityRepo {
    /// Insert a project row. Projects have neither parent nor project id.
    pub async fn create_project(pool: &PgPool, input: &CreateProject) -> Result<Entity, sqlx::Error> {
        let query = format!(
            "INSERT INTO entities (entity_type, name, file_tree, data)
             VALUES ('project', $1, $2, COALESCE($3, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Entity>(&query)
            .bind(&input.name)
            .bind(&input.file_tree)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }

    /// Insert a non-project entity under `input.parent_id`.
    pub async fn create(pool: &PgPool, input: &CreateEntity) -> Result<Entity, sqlx::Error> {
        let query = format!(
            "INSERT INTO entities (project_id, parent_id, entity_type, name, data)
             VALUES ($1, $2, $3, $4, COALESCE($5, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Entity>(&query)
            .bind(input.project_id)
            .bind(input.parent_id)
            .bind(input.entity_type.name())
            .bind(&input.name)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Entity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM entities WHERE id = $1");
        sqlx::query_as::<_, Entity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects ordered by name.
    pub async fn list_projects(pool: &PgPool) -> Result<Vec<Entity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM entities WHERE entity_type = 'project' ORDER BY name"
        );
        sqlx::query_as::<_, Entity>(&query).fetch_all(pool).await
    }

    /// Direct children of `parent_id`, optionally of one type, ordered by name.
    pub async fn list_children(
        pool: &PgPool,
        parent_id: DbId,
        entity_type: Option<EntityType>,
    ) -> Result<Vec<Entity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM entities
             WHERE parent_id = $1 AND ($2::TEXT IS NULL OR entity_type = $2)
             ORDER BY name, id"
        );
        sqlx::query_as::<_, Entity>(&query)
            .bind(parent_id)
            .bind(entity_type.map(EntityType::name))
            .fetch_all(pool)
            .await
    }

    /// The entity and its ancestors, following parent pointers for at most
    /// `max_rows` rows. Order is unspecified.
    ///
    /// The row limit keeps the walk finite when parent pointers form a cycle;
    /// the caller detects the cycle on the returned rows.
    pub async fn fetch_ancestry(
        pool: &PgPool,
        id: DbId,
        max_rows: i32,
    ) -> Result<Vec<Entity>, sqlx::Error> {
        let query = format!(
            "WITH RECURSIVE ancestry AS (
                SELECT {COLUMNS}, 1 AS depth FROM entities WHERE id = $1
                UNION ALL
                SELECT {E_COLUMNS}, a.depth + 1
                FROM entities e
                JOIN ancestry a ON e.id = a.parent_id
                WHERE a.depth < $2
             )
             SELECT {COLUMNS} FROM ancestry"
        );
        sqlx::query_as::<_, Entity>(&query)
            .bind(id)
            .bind(max_rows)
            .fetch_all(pool)
            .await
    }
}
