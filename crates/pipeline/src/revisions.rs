//! Working and output file revisions.
//!
//! Creating a revision is one transaction: reserve the next number on the
//! key's counter row, resolve the path, insert the row, commit. A failed
//! attempt rolls the counter back with everything else.

use std::sync::Arc;

use kinetrack_core::error::CoreError;
use kinetrack_core::file_tree::{resolve_path, FileContext, FileTreeTemplate, ResolvedPath};
use kinetrack_core::revision::{
    validate_comment, validate_file_name, validate_representation, RevisionKey, VariantKey,
    DEFAULT_FILE_NAME,
};
use kinetrack_core::types::DbId;
use kinetrack_db::models::output_file::{NewOutputFile, OutputFile, UpdateOutputFile};
use kinetrack_db::models::status::{FileStatus, StatusId};
use kinetrack_db::models::working_file::{NewWorkingFile, UpdateWorkingFile, WorkingFile};
use kinetrack_db::repositories::{
    OutputFileRepo, PersonRepo, RevisionCounterRepo, TaskRepo, WorkingFileRepo,
};
use serde::Deserialize;
use validator::Validate;

use crate::engine::FileEngine;
use crate::error::{found, PipelineError, PipelineResult};
use crate::paths::TaskScope;
use crate::retry::with_allocation_retry;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request to register a new working file revision.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkingFile {
    pub task_id: DbId,
    pub software_id: DbId,
    pub person_id: DbId,
    /// Logical file name; `main` when absent.
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

/// Request to register a new output file revision.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOutputFile {
    pub task_id: DbId,
    pub output_type_id: DbId,
    pub person_id: DbId,
    /// Breakdown instance the output was produced for. Must be placed in the
    /// task's entity.
    pub asset_instance_id: Option<DbId>,
    /// Working file the output was produced from. Must belong to the same task.
    pub source_file_id: Option<DbId>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub representation: Option<String>,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

/// Everything an attempt needs besides the revision number.
struct PreparedFile {
    key: RevisionKey,
    context: FileContext,
    template: Arc<FileTreeTemplate>,
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

impl FileEngine {
    /// Register the next working file revision for (task, software, name).
    pub async fn create_working_file(&self, input: &CreateWorkingFile) -> PipelineResult<WorkingFile> {
        input.validate()?;
        let name = checked_name(input.name.as_deref(), input.comment.as_deref())?;
        let scope = self.task_scope(input.task_id).await?;
        let software = self.software(input.software_id).await?;
        self.ensure_person(input.person_id).await?;

        let prepared = prepare(
            &scope,
            scope.working_context(&software, name, 1),
            VariantKey::Software {
                software_id: software.id,
            },
        )?;
        let prepared = &prepared;
        let file = with_allocation_retry(
            &self.retry,
            "create_working_file",
            PipelineError::is_retryable,
            move || self.insert_working_attempt(prepared, input),
        )
        .await?;

        tracing::info!(
            file_id = file.id,
            task_id = file.task_id,
            revision = file.revision,
            path = %file.full_path(),
            "Working file created"
        );
        Ok(file)
    }

    /// Register the next output file revision for
    /// (task, output type, instance, name).
    pub async fn create_output_file(&self, input: &CreateOutputFile) -> PipelineResult<OutputFile> {
        input.validate()?;
        let name = checked_name(input.name.as_deref(), input.comment.as_deref())?;
        if let Some(representation) = input.representation.as_deref() {
            validate_representation(representation)?;
        }
        let scope = self.task_scope(input.task_id).await?;
        let output_type = self.output_type(input.output_type_id).await?;
        self.ensure_person(input.person_id).await?;

        let instance = match input.asset_instance_id {
            Some(instance_id) => {
                let instance = self.asset_instance(instance_id).await?;
                if instance.target_entity_id != scope.task.entity_id {
                    return Err(CoreError::InvalidHierarchy(format!(
                        "Asset instance {instance_id} is not placed in entity {}",
                        scope.task.entity_id
                    ))
                    .into());
                }
                if !instance.is_active() {
                    return Err(CoreError::Validation(format!(
                        "Asset instance {instance_id} was removed from the breakdown"
                    ))
                    .into());
                }
                Some(self.instance_context(&instance).await?)
            }
            None => None,
        };

        if let Some(source_id) = input.source_file_id {
            let source = found(
                WorkingFileRepo::find_by_id(&self.pool, source_id).await?,
                "WorkingFile",
                source_id,
            )?;
            if source.task_id != scope.task.id {
                return Err(CoreError::Validation(format!(
                    "Source working file {source_id} belongs to task {}, not {}",
                    source.task_id, scope.task.id
                ))
                .into());
            }
        }

        let prepared = prepare(
            &scope,
            scope.output_context(
                &output_type,
                input.representation.as_deref(),
                instance,
                name,
                1,
            ),
            VariantKey::Output {
                output_type_id: output_type.id,
                asset_instance_id: input.asset_instance_id,
            },
        )?;
        let prepared = &prepared;
        let file = with_allocation_retry(
            &self.retry,
            "create_output_file",
            PipelineError::is_retryable,
            move || self.insert_output_attempt(prepared, input),
        )
        .await?;

        tracing::info!(
            file_id = file.id,
            task_id = file.task_id,
            revision = file.revision,
            path = %file.full_path(),
            "Output file created"
        );
        Ok(file)
    }

    async fn insert_working_attempt(
        &self,
        prepared: &PreparedFile,
        input: &CreateWorkingFile,
    ) -> PipelineResult<WorkingFile> {
        let mut tx = self.pool.begin().await?;
        let revision = RevisionCounterRepo::allocate(&mut tx, &prepared.key).await?;
        let path = prepared.resolve(revision)?;
        let file = WorkingFileRepo::insert(
            &mut tx,
            &NewWorkingFile {
                task_id: prepared.key.task_id,
                entity_id: prepared.key.entity_id,
                person_id: input.person_id,
                software_id: input.software_id,
                name: prepared.key.name.clone(),
                revision,
                variant_key: prepared.key.variant.as_key(),
                comment: input.comment.clone(),
                path: path.folder,
                file_name: path.file_name,
            },
        )
        .await
        .map_err(PipelineError::from_write)?;
        tx.commit().await?;
        Ok(file)
    }

    async fn insert_output_attempt(
        &self,
        prepared: &PreparedFile,
        input: &CreateOutputFile,
    ) -> PipelineResult<OutputFile> {
        let mut tx = self.pool.begin().await?;
        let revision = RevisionCounterRepo::allocate(&mut tx, &prepared.key).await?;
        let path = prepared.resolve(revision)?;
        let file = OutputFileRepo::insert(
            &mut tx,
            &NewOutputFile {
                task_id: prepared.key.task_id,
                entity_id: prepared.key.entity_id,
                person_id: input.person_id,
                output_type_id: input.output_type_id,
                asset_instance_id: input.asset_instance_id,
                source_file_id: input.source_file_id,
                name: prepared.key.name.clone(),
                representation: input.representation.clone(),
                revision,
                variant_key: prepared.key.variant.as_key(),
                comment: input.comment.clone(),
                path: path.folder,
                file_name: path.file_name,
            },
        )
        .await
        .map_err(PipelineError::from_write)?;
        tx.commit().await?;
        Ok(file)
    }

    async fn ensure_person(&self, person_id: DbId) -> PipelineResult<()> {
        found(
            PersonRepo::find_by_id(&self.pool, person_id).await?,
            "Person",
            person_id,
        )?;
        Ok(())
    }
}

impl PreparedFile {
    fn resolve(&self, revision: i32) -> Result<ResolvedPath, CoreError> {
        let context = FileContext {
            revision,
            ..self.context.clone()
        };
        resolve_path(&self.template, &context)
    }
}

/// Build the revision key and check that the context resolves at all, so
/// template and naming errors surface before any number is reserved.
fn prepare(scope: &TaskScope, context: FileContext, variant: VariantKey) -> PipelineResult<PreparedFile> {
    let template = Arc::clone(&scope.scoped.template);
    resolve_path(&template, &context)?;
    Ok(PreparedFile {
        key: RevisionKey {
            entity_id: scope.task.entity_id,
            task_id: scope.task.id,
            name: context.name.clone(),
            variant,
        },
        context,
        template,
    })
}

fn checked_name<'a>(name: Option<&'a str>, comment: Option<&str>) -> Result<&'a str, CoreError> {
    let name = name.unwrap_or(DEFAULT_FILE_NAME);
    validate_file_name(name)?;
    if let Some(comment) = comment {
        validate_comment(comment)?;
    }
    Ok(name)
}

// ---------------------------------------------------------------------------
// Queries and updates
// ---------------------------------------------------------------------------

impl FileEngine {
    /// The revision the next working file of this key would get. Reserves nothing.
    pub async fn peek_next_working_revision(
        &self,
        task_id: DbId,
        software_id: DbId,
        name: Option<&str>,
    ) -> PipelineResult<i32> {
        let key = self
            .revision_key(task_id, name, VariantKey::Software { software_id })
            .await?;
        Ok(RevisionCounterRepo::peek_next(&self.pool, &key).await?)
    }

    /// The revision the next output file of this key would get. Reserves nothing.
    pub async fn peek_next_output_revision(
        &self,
        task_id: DbId,
        output_type_id: DbId,
        asset_instance_id: Option<DbId>,
        name: Option<&str>,
    ) -> PipelineResult<i32> {
        let key = self
            .revision_key(
                task_id,
                name,
                VariantKey::Output {
                    output_type_id,
                    asset_instance_id,
                },
            )
            .await?;
        Ok(RevisionCounterRepo::peek_next(&self.pool, &key).await?)
    }

    /// Highest working file revision of (task, software, name).
    pub async fn last_working_file(
        &self,
        task_id: DbId,
        software_id: DbId,
        name: Option<&str>,
    ) -> PipelineResult<Option<WorkingFile>> {
        let key = self
            .revision_key(task_id, name, VariantKey::Software { software_id })
            .await?;
        Ok(WorkingFileRepo::find_last(&self.pool, &key).await?)
    }

    pub async fn list_working_files(&self, task_id: DbId) -> PipelineResult<Vec<WorkingFile>> {
        found(TaskRepo::find_by_id(&self.pool, task_id).await?, "Task", task_id)?;
        Ok(WorkingFileRepo::list_by_task(&self.pool, task_id).await?)
    }

    pub async fn list_output_files(&self, task_id: DbId) -> PipelineResult<Vec<OutputFile>> {
        found(TaskRepo::find_by_id(&self.pool, task_id).await?, "Task", task_id)?;
        Ok(OutputFileRepo::list_by_task(&self.pool, task_id).await?)
    }

    /// Update the comment and status of a working file. Revision and path
    /// never change.
    pub async fn update_working_file(
        &self,
        id: DbId,
        input: &UpdateWorkingFile,
    ) -> PipelineResult<WorkingFile> {
        check_update(input.comment.as_deref(), input.file_status_id)?;
        found(
            WorkingFileRepo::update(&self.pool, id, input).await?,
            "WorkingFile",
            id,
        )
    }

    /// Update the comment and status of an output file.
    pub async fn update_output_file(
        &self,
        id: DbId,
        input: &UpdateOutputFile,
    ) -> PipelineResult<OutputFile> {
        check_update(input.comment.as_deref(), input.file_status_id)?;
        found(
            OutputFileRepo::update(&self.pool, id, input).await?,
            "OutputFile",
            id,
        )
    }

    async fn revision_key(
        &self,
        task_id: DbId,
        name: Option<&str>,
        variant: VariantKey,
    ) -> PipelineResult<RevisionKey> {
        let name = name.unwrap_or(DEFAULT_FILE_NAME);
        validate_file_name(name)?;
        let task = found(TaskRepo::find_by_id(&self.pool, task_id).await?, "Task", task_id)?;
        Ok(RevisionKey {
            entity_id: task.entity_id,
            task_id,
            name: name.to_string(),
            variant,
        })
    }
}

fn check_update(comment: Option<&str>, file_status_id: Option<StatusId>) -> Result<(), CoreError> {
    if let Some(comment) = comment {
        validate_comment(comment)?;
    }
    if let Some(status_id) = file_status_id {
        if FileStatus::from_id(status_id).is_none() {
            return Err(CoreError::Validation(format!(
                "Unknown file status id {status_id}"
            )));
        }
    }
    Ok(())
}
