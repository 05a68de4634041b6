//! Repository for the `asset_instances` and `asset_instance_counters` tables.

use kinetrack_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::asset_instance::{AssetInstance, NewAssetInstance};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, asset_id, target_entity_id, target_entity_type, number, description, \
    removed_at, created_at, updated_at";

pub struct AssetInstanceRepo;

impl AssetInstanceRepo {
    // ── Counter ──────────────────────────────────────────────────────

    /// Lock the (asset, target) counter row for the rest of the transaction,
    /// creating it at zero if absent. Returns the highest number handed out.
    pub async fn lock_counter(
        conn: &mut PgConnection,
        asset_id: DbId,
        target_entity_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO asset_instance_counters (asset_id, target_entity_id, last_number)
             VALUES ($1, $2, 0)
             ON CONFLICT (asset_id, target_entity_id)
             DO UPDATE SET last_number = asset_instance_counters.last_number
             RETURNING last_number",
        )
        .bind(asset_id)
        .bind(target_entity_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.0)
    }

    /// Reserve the next instance number for (asset, target).
    pub async fn allocate_number(
        conn: &mut PgConnection,
        asset_id: DbId,
        target_entity_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO asset_instance_counters (asset_id, target_entity_id, last_number)
             VALUES ($1, $2, 1)
             ON CONFLICT (asset_id, target_entity_id)
             DO UPDATE SET last_number = asset_instance_counters.last_number + 1, updated_at = NOW()
             RETURNING last_number",
        )
        .bind(asset_id)
        .bind(target_entity_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.0)
    }

    // ── Instances ────────────────────────────────────────────────────

    pub async fn insert(
        conn: &mut PgConnection,
        input: &NewAssetInstance,
    ) -> Result<AssetInstance, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_instances
                (asset_id, target_entity_id, target_entity_type, number, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetInstance>(&query)
            .bind(input.asset_id)
            .bind(input.target_entity_id)
            .bind(&input.target_entity_type)
            .bind(input.number)
            .bind(&input.description)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AssetInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_instances WHERE id = $1");
        sqlx::query_as::<_, AssetInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The lowest-numbered active instance of the asset in the target.
    pub async fn find_lowest_active(
        conn: &mut PgConnection,
        asset_id: DbId,
        target_entity_id: DbId,
    ) -> Result<Option<AssetInstance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_instances
             WHERE asset_id = $1 AND target_entity_id = $2 AND removed_at IS NULL
             ORDER BY number
             LIMIT 1"
        );
        sqlx::query_as::<_, AssetInstance>(&query)
            .bind(asset_id)
            .bind(target_entity_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Instances of the asset in the target ordered by number.
    pub async fn list(
        pool: &PgPool,
        asset_id: DbId,
        target_entity_id: DbId,
        include_removed: bool,
    ) -> Result<Vec<AssetInstance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM asset_instances
             WHERE asset_id = $1 AND target_entity_id = $2
               AND ($3 OR removed_at IS NULL)
             ORDER BY number"
        );
        sqlx::query_as::<_, AssetInstance>(&query)
            .bind(asset_id)
            .bind(target_entity_id)
            .bind(include_removed)
            .fetch_all(pool)
            .await
    }

    pub async fn count_active(
        pool: &PgPool,
        asset_id: DbId,
        target_entity_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM asset_instances
             WHERE asset_id = $1 AND target_entity_id = $2 AND removed_at IS NULL",
        )
        .bind(asset_id)
        .bind(target_entity_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Mark an instance removed. Idempotent: an already removed instance keeps
    /// its original timestamp. Returns `None` if the instance does not exist.
    pub async fn mark_removed(pool: &PgPool, id: DbId) -> Result<Option<AssetInstance>, sqlx::Error> {
        let query = format!(
            "UPDATE asset_instances SET removed_at = COALESCE(removed_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
