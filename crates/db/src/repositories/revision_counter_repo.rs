//! Repository for the `revision_counters` table.
//!
//! One row per revision key holds the highest revision handed out. The row is
//! written by an upsert inside the caller's transaction, so the row lock
//! serializes allocators of the same key until commit, and a rollback returns
//! the number.

use kinetrack_core::revision::RevisionKey;
use sqlx::{PgConnection, PgPool};

pub struct RevisionCounterRepo;

impl RevisionCounterRepo {
    /// Reserve the next revision for `key`.
    ///
    /// Must run on the transaction that inserts the file row.
    pub async fn allocate(conn: &mut PgConnection, key: &RevisionKey) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO revision_counters (entity_id, task_id, name, variant_key, last_revision)
             VALUES ($1, $2, $3, $4, 1)
             ON CONFLICT (entity_id, task_id, name, variant_key)
             DO UPDATE SET last_revision = revision_counters.last_revision + 1, updated_at = NOW()
             RETURNING last_revision",
        )
        .bind(key.entity_id)
        .bind(key.task_id)
        .bind(&key.name)
        .bind(key.variant.as_key())
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.0)
    }

    /// The revision the next allocation for `key` would return. Reserves nothing.
    pub async fn peek_next(pool: &PgPool, key: &RevisionKey) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(last_revision), 0) + 1 FROM revision_counters
             WHERE entity_id = $1 AND task_id = $2 AND name = $3 AND variant_key = $4",
        )
        .bind(key.entity_id)
        .bind(key.task_id)
        .bind(&key.name)
        .bind(key.variant.as_key())
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
