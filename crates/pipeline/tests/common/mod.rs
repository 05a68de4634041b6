//! Fixtures shared by the engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use kinetrack_core::file_tree::FileTreeRegistry;
use kinetrack_core::hierarchy::EntityType;
use kinetrack_db::models::entity::Entity;
use kinetrack_db::models::output_type::CreateOutputType;
use kinetrack_db::models::person::CreatePerson;
use kinetrack_db::models::software::CreateSoftware;
use kinetrack_db::models::task::{CreateTask, CreateTaskType, Task};
use kinetrack_db::repositories::{
    OutputTypeRepo, PersonRepo, SoftwareRepo, TaskRepo, TaskTypeRepo,
};
use kinetrack_pipeline::revisions::{CreateOutputFile, CreateWorkingFile};
use kinetrack_pipeline::FileEngine;
use sqlx::PgPool;

pub fn engine(pool: &PgPool) -> FileEngine {
    FileEngine::new(
        pool.clone(),
        Arc::new(FileTreeRegistry::with_builtins().unwrap()),
    )
}

/// Catalog rows every file test needs.
pub struct Catalog {
    pub person_id: i64,
    pub blender_id: i64,
    pub maya_id: i64,
    pub cache_id: i64,
    pub render_id: i64,
    pub animation_type_id: i64,
}

pub async fn catalog(pool: &PgPool) -> Catalog {
    let person = PersonRepo::create(
        pool,
        &CreatePerson {
            first_name: "Ada".to_string(),
            last_name: None,
            email: "ada@studio.test".to_string(),
        },
    )
    .await
    .unwrap();
    let software = |name: &str, ext: &str| CreateSoftware {
        name: name.to_string(),
        short_name: None,
        file_extension: ext.to_string(),
    };
    let blender = SoftwareRepo::create(pool, &software("Blender", "blend")).await.unwrap();
    let maya = SoftwareRepo::create(pool, &software("Maya", "ma")).await.unwrap();
    let output_type = |name: &str| CreateOutputType {
        name: name.to_string(),
        short_name: None,
    };
    let cache = OutputTypeRepo::create(pool, &output_type("Cache")).await.unwrap();
    let render = OutputTypeRepo::create(pool, &output_type("Render")).await.unwrap();
    let animation = TaskTypeRepo::create(
        pool,
        &CreateTaskType {
            name: "Animation".to_string(),
            short_name: None,
            for_entity: None,
        },
    )
    .await
    .unwrap();
    Catalog {
        person_id: person.id,
        blender_id: blender.id,
        maya_id: maya.id,
        cache_id: cache.id,
        render_id: render.id,
        animation_type_id: animation.id,
    }
}

pub struct Production {
    pub project: Entity,
    pub sequence: Entity,
    pub shot: Entity,
    pub shot_two: Entity,
    pub rabbit: Entity,
}

/// Alpha / E01 / S01 / {SH01, SH02} plus Characters / Rabbit.
pub async fn production(engine: &FileEngine, file_tree: &str) -> Production {
    let project = engine.create_project("Alpha", Some(file_tree)).await.unwrap();
    let episode = engine
        .create_entity(project.id, EntityType::Episode, "E01", None)
        .await
        .unwrap();
    let sequence = engine
        .create_entity(episode.id, EntityType::Sequence, "S01", None)
        .await
        .unwrap();
    let shot = engine
        .create_entity(sequence.id, EntityType::Shot, "SH01", None)
        .await
        .unwrap();
    let shot_two = engine
        .create_entity(sequence.id, EntityType::Shot, "SH02", None)
        .await
        .unwrap();
    let characters = engine
        .create_entity(project.id, EntityType::AssetType, "Characters", None)
        .await
        .unwrap();
    let rabbit = engine
        .create_entity(characters.id, EntityType::Asset, "Rabbit", None)
        .await
        .unwrap();
    Production {
        project,
        sequence,
        shot,
        shot_two,
        rabbit,
    }
}

pub async fn task(pool: &PgPool, entity: &Entity, task_type_id: i64) -> Task {
    TaskRepo::create(
        pool,
        &CreateTask {
            project_id: entity.root_project_id(),
            entity_id: entity.id,
            task_type_id,
            name: None,
        },
    )
    .await
    .unwrap()
}

pub fn working(task_id: i64, software_id: i64, person_id: i64) -> CreateWorkingFile {
    CreateWorkingFile {
        task_id,
        software_id,
        person_id,
        name: None,
        comment: None,
    }
}

pub fn output(task_id: i64, output_type_id: i64, person_id: i64) -> CreateOutputFile {
    CreateOutputFile {
        task_id,
        output_type_id,
        person_id,
        asset_instance_id: None,
        source_file_id: None,
        name: None,
        representation: Some("abc".to_string()),
        comment: None,
    }
}
