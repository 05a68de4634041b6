//! Path resolution for stored file revisions.
//!
//! The helpers here build a [`FileContext`] from database rows; both file
//! creation and [`FileEngine::resolve_path_for`] go through them, so a
//! stored revision always re-resolves to the path it was created with while
//! names and the template are unchanged.

use kinetrack_core::error::CoreError;
use kinetrack_core::file_tree::{
    resolve_path, FileContext, FileVariant, InstanceContext, ResolvedPath,
};
use kinetrack_core::hierarchy::EntityType;
use kinetrack_core::types::DbId;
use kinetrack_db::models::asset_instance::AssetInstance;
use kinetrack_db::models::output_type::OutputType;
use kinetrack_db::models::software::Software;
use kinetrack_db::models::task::{Task, TaskType};
use kinetrack_db::repositories::{
    AssetInstanceRepo, OutputFileRepo, OutputTypeRepo, SoftwareRepo, TaskRepo, TaskTypeRepo,
    WorkingFileRepo,
};
use serde::{Deserialize, Serialize};

use crate::engine::FileEngine;
use crate::error::{found, PipelineResult};
use crate::hierarchy::ScopedChain;

/// A stored file revision of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FileRevisionRef {
    Working(DbId),
    Output(DbId),
}

/// A task with its type and the resolved chain of its entity.
#[derive(Debug, Clone)]
pub(crate) struct TaskScope {
    pub task: Task,
    pub task_type: TaskType,
    pub scoped: ScopedChain,
}

impl TaskScope {
    pub fn working_context(&self, software: &Software, name: &str, revision: i32) -> FileContext {
        self.context(
            name,
            revision,
            FileVariant::Working {
                software: short_or_name(&software.short_name, &software.name),
                extension: software.file_extension.clone(),
            },
        )
    }

    pub fn output_context(
        &self,
        output_type: &OutputType,
        representation: Option<&str>,
        instance: Option<InstanceContext>,
        name: &str,
        revision: i32,
    ) -> FileContext {
        self.context(
            name,
            revision,
            FileVariant::Output {
                output_type: short_or_name(&output_type.short_name, &output_type.name),
                representation: representation.map(str::to_string),
                instance,
            },
        )
    }

    fn context(&self, name: &str, revision: i32, variant: FileVariant) -> FileContext {
        FileContext {
            chain: self.scoped.chain.clone(),
            task_type: short_or_name(&self.task_type.short_name, &self.task_type.name),
            task: self.task.name.clone(),
            name: name.to_string(),
            revision,
            variant,
        }
    }
}

/// Catalog entries render by short name when they have one.
fn short_or_name(short_name: &str, name: &str) -> String {
    if short_name.trim().is_empty() {
        name.to_string()
    } else {
        short_name.to_string()
    }
}

impl FileEngine {
    /// Resolve the on-disk location of a stored revision under its project's
    /// current template.
    pub async fn resolve_path_for(&self, file: FileRevisionRef) -> PipelineResult<ResolvedPath> {
        match file {
            FileRevisionRef::Working(id) => {
                let file = found(
                    WorkingFileRepo::find_by_id(&self.pool, id).await?,
                    "WorkingFile",
                    id,
                )?;
                let scope = self.task_scope(file.task_id).await?;
                let software = self.software(file.software_id).await?;
                let ctx = scope.working_context(&software, &file.name, file.revision);
                Ok(resolve_path(&scope.scoped.template, &ctx)?)
            }
            FileRevisionRef::Output(id) => {
                let file = found(
                    OutputFileRepo::find_by_id(&self.pool, id).await?,
                    "OutputFile",
                    id,
                )?;
                let scope = self.task_scope(file.task_id).await?;
                let output_type = self.output_type(file.output_type_id).await?;
                let instance = match file.asset_instance_id {
                    Some(instance_id) => {
                        let instance = self.asset_instance(instance_id).await?;
                        Some(self.instance_context(&instance).await?)
                    }
                    None => None,
                };
                let ctx = scope.output_context(
                    &output_type,
                    file.representation.as_deref(),
                    instance,
                    &file.name,
                    file.revision,
                );
                Ok(resolve_path(&scope.scoped.template, &ctx)?)
            }
        }
    }

    // ── Row loaders ──────────────────────────────────────────────────

    pub(crate) async fn task_scope(&self, task_id: DbId) -> PipelineResult<TaskScope> {
        let task = found(TaskRepo::find_by_id(&self.pool, task_id).await?, "Task", task_id)?;
        let task_type = found(
            TaskTypeRepo::find_by_id(&self.pool, task.task_type_id).await?,
            "TaskType",
            task.task_type_id,
        )?;
        let scoped = self.scoped_chain(task.entity_id).await?;
        Ok(TaskScope {
            task,
            task_type,
            scoped,
        })
    }

    pub(crate) async fn software(&self, id: DbId) -> PipelineResult<Software> {
        found(SoftwareRepo::find_by_id(&self.pool, id).await?, "Software", id)
    }

    pub(crate) async fn output_type(&self, id: DbId) -> PipelineResult<OutputType> {
        found(OutputTypeRepo::find_by_id(&self.pool, id).await?, "OutputType", id)
    }

    pub(crate) async fn asset_instance(&self, id: DbId) -> PipelineResult<AssetInstance> {
        found(
            AssetInstanceRepo::find_by_id(&self.pool, id).await?,
            "AssetInstance",
            id,
        )
    }

    /// Asset type, asset, and number of a breakdown instance.
    pub(crate) async fn instance_context(
        &self,
        instance: &AssetInstance,
    ) -> PipelineResult<InstanceContext> {
        let chain = self.resolve_chain(instance.asset_id).await?;
        let asset_type = chain.find(EntityType::AssetType).ok_or_else(|| {
            CoreError::InvalidHierarchy(format!(
                "Asset {} has no asset type in its chain",
                instance.asset_id
            ))
        })?;
        Ok(InstanceContext {
            asset_type: asset_type.name.clone(),
            asset: chain.leaf().name.clone(),
            number: instance.number,
        })
    }
}
