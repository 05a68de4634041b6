//! Repository for the `working_files` table.

use kinetrack_core::revision::RevisionKey;
use kinetrack_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::working_file::{NewWorkingFile, UpdateWorkingFile, WorkingFile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, task_id, entity_id, person_id, software_id, name, revision, \
    variant_key, comment, file_status_id, path, file_name, created_at, updated_at";

/// Append-only store of working file revisions.
pub struct WorkingFileRepo;

impl WorkingFileRepo {
    /// Insert a revision whose number was reserved on the same transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &NewWorkingFile,
    ) -> Result<WorkingFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO working_files
                (task_id, entity_id, person_id, software_id, name, revision, variant_key,
                 comment, path, file_name)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkingFile>(&query)
            .bind(input.task_id)
            .bind(input.entity_id)
            .bind(input.person_id)
            .bind(input.software_id)
            .bind(&input.name)
            .bind(input.revision)
            .bind(&input.variant_key)
            .bind(&input.comment)
            .bind(&input.path)
            .bind(&input.file_name)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WorkingFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM working_files WHERE id = $1");
        sqlx::query_as::<_, WorkingFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All revisions of one key, oldest first.
    pub async fn list_revisions(
        pool: &PgPool,
        key: &RevisionKey,
    ) -> Result<Vec<WorkingFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM working_files
             WHERE entity_id = $1 AND task_id = $2 AND name = $3 AND variant_key = $4
             ORDER BY revision"
        );
        sqlx::query_as::<_, WorkingFile>(&query)
            .bind(key.entity_id)
            .bind(key.task_id)
            .bind(&key.name)
            .bind(key.variant.as_key())
            .fetch_all(pool)
            .await
    }

    /// Highest revision of one key.
    pub async fn find_last(
        pool: &PgPool,
        key: &RevisionKey,
    ) -> Result<Option<WorkingFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM working_files
             WHERE entity_id = $1 AND task_id = $2 AND name = $3 AND variant_key = $4
             ORDER BY revision DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, WorkingFile>(&query)
            .bind(key.entity_id)
            .bind(key.task_id)
            .bind(&key.name)
            .bind(key.variant.as_key())
            .fetch_optional(pool)
            .await
    }

    /// Every working file of a task, grouped by name and variant, newest
    /// revision first within a group.
    pub async fn list_by_task(pool: &PgPool, task_id: DbId) -> Result<Vec<WorkingFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM working_files
             WHERE task_id = $1
             ORDER BY name, variant_key, revision DESC"
        );
        sqlx::query_as::<_, WorkingFile>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Update comment and status. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorkingFile,
    ) -> Result<Option<WorkingFile>, sqlx::Error> {
        let query = format!(
            "UPDATE working_files SET
                comment = COALESCE($2, comment),
                file_status_id = COALESCE($3, file_status_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkingFile>(&query)
            .bind(id)
            .bind(&input.comment)
            .bind(input.file_status_id)
            .fetch_optional(pool)
            .await
    }
}
