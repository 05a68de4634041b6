//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use kinetrack_core::hierarchy::EntityType;
use kinetrack_db::models::entity::{CreateEntity, CreateProject, Entity};
use kinetrack_db::models::person::CreatePerson;
use kinetrack_db::models::software::CreateSoftware;
use kinetrack_db::models::task::{CreateTask, CreateTaskType, Task};
use kinetrack_db::repositories::{EntityRepo, PersonRepo, SoftwareRepo, TaskRepo, TaskTypeRepo};
use sqlx::PgPool;

pub async fn project(pool: &PgPool, name: &str) -> Entity {
    EntityRepo::create_project(
        pool,
        &CreateProject {
            name: name.to_string(),
            file_tree: "default".to_string(),
            data: None,
        },
    )
    .await
    .unwrap()
}

pub async fn child(pool: &PgPool, parent: &Entity, entity_type: EntityType, name: &str) -> Entity {
    EntityRepo::create(
        pool,
        &CreateEntity {
            project_id: parent.root_project_id(),
            parent_id: parent.id,
            entity_type,
            name: name.to_string(),
            data: None,
        },
    )
    .await
    .unwrap()
}

/// Project Alpha / E01 / S01 / SH01. Returns (project, shot).
pub async fn shot_hierarchy(pool: &PgPool) -> (Entity, Entity) {
    let project = project(pool, "Alpha").await;
    let episode = child(pool, &project, EntityType::Episode, "E01").await;
    let sequence = child(pool, &episode, EntityType::Sequence, "S01").await;
    let shot = child(pool, &sequence, EntityType::Shot, "SH01").await;
    (project, shot)
}

pub async fn task(pool: &PgPool, entity: &Entity, task_type: &str) -> Task {
    let task_type = TaskTypeRepo::create(
        pool,
        &CreateTaskType {
            name: task_type.to_string(),
            short_name: None,
            for_entity: None,
        },
    )
    .await
    .unwrap();
    TaskRepo::create(
        pool,
        &CreateTask {
            project_id: entity.root_project_id(),
            entity_id: entity.id,
            task_type_id: task_type.id,
            name: None,
        },
    )
    .await
    .unwrap()
}

/// Returns (person_id, software_id).
pub async fn author_and_software(pool: &PgPool) -> (i64, i64) {
    let person = PersonRepo::create(
        pool,
        &CreatePerson {
            first_name: "Ada".to_string(),
            last_name: Some("Lane".to_string()),
            email: "ada@studio.test".to_string(),
        },
    )
    .await
    .unwrap();
    let software = SoftwareRepo::create(
        pool,
        &CreateSoftware {
            name: "Blender".to_string(),
            short_name: Some("blender".to_string()),
            file_extension: "blend".to_string(),
        },
    )
    .await
    .unwrap();
    (person.id, software.id)
}
