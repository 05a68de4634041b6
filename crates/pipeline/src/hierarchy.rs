//! Entity hierarchy operations.

use std::sync::Arc;

use kinetrack_core::error::CoreError;
use kinetrack_core::file_tree::{FileTreeTemplate, DEFAULT_TEMPLATE};
use kinetrack_core::hierarchy::{
    validate_entity_name, validate_parent, EntityArena, EntityChain, EntityType, MAX_CHAIN_DEPTH,
};
use kinetrack_core::types::DbId;
use kinetrack_db::models::entity::{CreateEntity, CreateProject, Entity};
use kinetrack_db::repositories::EntityRepo;

use crate::engine::FileEngine;
use crate::error::{found, PipelineError, PipelineResult};

/// A resolved chain together with its project's file tree template.
#[derive(Debug, Clone)]
pub(crate) struct ScopedChain {
    pub chain: EntityChain,
    pub template: Arc<FileTreeTemplate>,
}

impl FileEngine {
    /// Create a project using the named file tree template, or the default
    /// one when `file_tree` is `None`.
    pub async fn create_project(
        &self,
        name: &str,
        file_tree: Option<&str>,
    ) -> PipelineResult<Entity> {
        validate_entity_name(name)?;
        let file_tree = file_tree.unwrap_or(DEFAULT_TEMPLATE);
        self.registry.get(file_tree)?;

        let project = EntityRepo::create_project(
            &self.pool,
            &CreateProject {
                name: name.to_string(),
                file_tree: file_tree.to_string(),
                data: None,
            },
        )
        .await
        .map_err(PipelineError::from_write)?;

        tracing::info!(project_id = project.id, project = name, file_tree, "Project created");
        Ok(project)
    }

    /// Create an entity under `parent_id`, enforcing the parent rules.
    pub async fn create_entity(
        &self,
        parent_id: DbId,
        entity_type: EntityType,
        name: &str,
        data: Option<serde_json::Value>,
    ) -> PipelineResult<Entity> {
        validate_entity_name(name)?;
        if entity_type == EntityType::Project {
            return Err(CoreError::InvalidHierarchy(
                "Projects are created with create_project and have no parent".to_string(),
            )
            .into());
        }
        let parent = self.find_entity(parent_id).await?;
        validate_parent(entity_type, Some(parent.kind()?))?;

        let entity = EntityRepo::create(
            &self.pool,
            &CreateEntity {
                project_id: parent.root_project_id(),
                parent_id,
                entity_type,
                name: name.to_string(),
                data,
            },
        )
        .await
        .map_err(PipelineError::from_write)?;

        tracing::debug!(
            entity_id = entity.id,
            parent_id,
            %entity_type,
            entity_name = name,
            "Entity created"
        );
        Ok(entity)
    }

    pub async fn find_entity(&self, id: DbId) -> PipelineResult<Entity> {
        found(EntityRepo::find_by_id(&self.pool, id).await?, "Entity", id)
    }

    /// Chain from the root project down to `entity_id`.
    pub async fn resolve_chain(&self, entity_id: DbId) -> PipelineResult<EntityChain> {
        let (chain, _) = self.load_chain(entity_id).await?;
        Ok(chain)
    }

    /// Direct children of an entity, optionally of one type, ordered by name.
    pub async fn children_of(
        &self,
        entity_id: DbId,
        type_filter: Option<EntityType>,
    ) -> PipelineResult<Vec<Entity>> {
        self.find_entity(entity_id).await?;
        Ok(EntityRepo::list_children(&self.pool, entity_id, type_filter).await?)
    }

    /// Resolve the chain of `entity_id` and the template of its project.
    pub(crate) async fn scoped_chain(&self, entity_id: DbId) -> PipelineResult<ScopedChain> {
        let (chain, rows) = self.load_chain(entity_id).await?;
        let project_id = chain.project().id;
        let file_tree = rows
            .iter()
            .find(|row| row.id == project_id)
            .and_then(|row| row.file_tree.as_deref())
            .ok_or_else(|| {
                CoreError::Internal(format!("Project {project_id} has no file tree template"))
            })?;
        let template = self.registry.get(file_tree)?;
        Ok(ScopedChain { chain, template })
    }

    async fn load_chain(&self, entity_id: DbId) -> PipelineResult<(EntityChain, Vec<Entity>)> {
        let rows =
            EntityRepo::fetch_ancestry(&self.pool, entity_id, MAX_CHAIN_DEPTH as i32 + 1).await?;
        let arena = rows
            .iter()
            .map(Entity::to_node)
            .collect::<Result<EntityArena, CoreError>>()?;
        let chain = arena.resolve_chain(entity_id)?;
        Ok((chain, rows))
    }
}
