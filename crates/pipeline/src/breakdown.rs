//! Breakdown instance assignment.
//!
//! Instance numbers come from a per-(asset, target) counter row that only
//! grows, so a removed instance's number is never handed out again.

use kinetrack_core::breakdown::{
    instance_display_name, numbered_instance_name, validate_asset_type, validate_target_type,
};
use kinetrack_core::error::CoreError;
use kinetrack_core::types::DbId;
use kinetrack_db::models::asset_instance::{AssetInstance, NewAssetInstance};
use kinetrack_db::models::entity::Entity;
use kinetrack_db::repositories::AssetInstanceRepo;
use serde::Serialize;

use crate::engine::FileEngine;
use crate::error::{found, PipelineError, PipelineResult};
use crate::retry::with_allocation_retry;

/// An asset instance with its display name.
#[derive(Debug, Clone, Serialize)]
pub struct NamedAssetInstance {
    #[serde(flatten)]
    pub instance: AssetInstance,
    pub display_name: String,
}

/// Asset and target rows, checked to be placeable.
struct Placement {
    asset: Entity,
    target: Entity,
}

impl FileEngine {
    /// The lowest-numbered active instance of the asset in the target,
    /// created if none exists.
    pub async fn get_or_create_instance(
        &self,
        asset_id: DbId,
        target_entity_id: DbId,
    ) -> PipelineResult<NamedAssetInstance> {
        let placement = self.placement(asset_id, target_entity_id).await?;
        let placement = &placement;
        let instance = with_allocation_retry(
            &self.retry,
            "get_or_create_instance",
            PipelineError::is_retryable,
            move || self.get_or_create_attempt(placement),
        )
        .await?;
        self.named(&placement.asset, instance).await
    }

    /// Place the asset into the target once more, always taking the next number.
    pub async fn add_instance(
        &self,
        asset_id: DbId,
        target_entity_id: DbId,
        description: Option<String>,
    ) -> PipelineResult<NamedAssetInstance> {
        let placement = self.placement(asset_id, target_entity_id).await?;
        let placement = &placement;
        let description = description.as_deref();
        let instance = with_allocation_retry(
            &self.retry,
            "add_instance",
            PipelineError::is_retryable,
            move || self.add_attempt(placement, description),
        )
        .await?;
        self.named(&placement.asset, instance).await
    }

    /// Take an instance out of the breakdown. Its number stays reserved.
    pub async fn remove_instance(&self, instance_id: DbId) -> PipelineResult<AssetInstance> {
        let instance = found(
            AssetInstanceRepo::mark_removed(&self.pool, instance_id).await?,
            "AssetInstance",
            instance_id,
        )?;
        tracing::info!(
            instance_id,
            asset_id = instance.asset_id,
            target_entity_id = instance.target_entity_id,
            number = instance.number,
            "Asset instance removed"
        );
        Ok(instance)
    }

    /// Instances of the asset in the target ordered by number.
    ///
    /// Removed instances are included only when asked for and always show
    /// their number.
    pub async fn list_instances(
        &self,
        asset_id: DbId,
        target_entity_id: DbId,
        include_removed: bool,
    ) -> PipelineResult<Vec<NamedAssetInstance>> {
        let Placement { asset, .. } = self.placement(asset_id, target_entity_id).await?;
        let instances =
            AssetInstanceRepo::list(&self.pool, asset_id, target_entity_id, include_removed)
                .await?;
        let active_count = instances.iter().filter(|i| i.is_active()).count();
        Ok(instances
            .into_iter()
            .map(|instance| {
                let display_name = if instance.is_active() {
                    instance_display_name(&asset.name, instance.number, active_count)
                } else {
                    numbered_instance_name(&asset.name, instance.number)
                };
                NamedAssetInstance {
                    instance,
                    display_name,
                }
            })
            .collect())
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn placement(&self, asset_id: DbId, target_entity_id: DbId) -> PipelineResult<Placement> {
        let asset = self.find_entity(asset_id).await?;
        let target = self.find_entity(target_entity_id).await?;
        validate_asset_type(asset.kind()?)?;
        validate_target_type(target.kind()?)?;
        if asset.root_project_id() != target.root_project_id() {
            return Err(CoreError::InvalidHierarchy(format!(
                "Asset {asset_id} and target {target_entity_id} belong to different projects"
            ))
            .into());
        }
        Ok(Placement { asset, target })
    }

    async fn get_or_create_attempt(&self, placement: &Placement) -> PipelineResult<AssetInstance> {
        let (asset_id, target_id) = (placement.asset.id, placement.target.id);
        let mut tx = self.pool.begin().await?;

        // Serializes callers of the same (asset, target) until commit.
        AssetInstanceRepo::lock_counter(&mut tx, asset_id, target_id).await?;
        if let Some(existing) =
            AssetInstanceRepo::find_lowest_active(&mut tx, asset_id, target_id).await?
        {
            tx.commit().await?;
            return Ok(existing);
        }

        let instance = self.insert_next_instance(&mut tx, placement, None).await?;
        tx.commit().await?;
        Ok(instance)
    }

    async fn add_attempt(
        &self,
        placement: &Placement,
        description: Option<&str>,
    ) -> PipelineResult<AssetInstance> {
        let mut tx = self.pool.begin().await?;
        let instance = self.insert_next_instance(&mut tx, placement, description).await?;
        tx.commit().await?;
        Ok(instance)
    }

    async fn insert_next_instance(
        &self,
        conn: &mut sqlx::PgConnection,
        placement: &Placement,
        description: Option<&str>,
    ) -> PipelineResult<AssetInstance> {
        let (asset_id, target_id) = (placement.asset.id, placement.target.id);
        let number = AssetInstanceRepo::allocate_number(conn, asset_id, target_id).await?;
        let instance = AssetInstanceRepo::insert(
            conn,
            &NewAssetInstance {
                asset_id,
                target_entity_id: target_id,
                target_entity_type: placement.target.entity_type.clone(),
                number,
                description: description.map(str::to_string),
            },
        )
        .await
        .map_err(PipelineError::from_write)?;
        tracing::info!(
            instance_id = instance.id,
            asset_id,
            target_entity_id = target_id,
            number,
            "Asset instance created"
        );
        Ok(instance)
    }

    async fn named(
        &self,
        asset: &Entity,
        instance: AssetInstance,
    ) -> PipelineResult<NamedAssetInstance> {
        let active_count =
            AssetInstanceRepo::count_active(&self.pool, asset.id, instance.target_entity_id)
                .await?;
        let display_name =
            instance_display_name(&asset.name, instance.number, active_count as usize);
        Ok(NamedAssetInstance {
            instance,
            display_name,
        })
    }
}
