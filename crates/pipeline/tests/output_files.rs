//! Integration tests for output file revisions, including outputs produced
//! for breakdown instances.

mod common;

use std::collections::HashSet;

use assert_matches::assert_matches;
use kinetrack_core::error::CoreError;
use kinetrack_db::models::output_file::UpdateOutputFile;
use kinetrack_db::models::status::FileStatus;
use kinetrack_pipeline::paths::FileRevisionRef;
use kinetrack_pipeline::revisions::CreateOutputFile;
use kinetrack_pipeline::PipelineError;
use sqlx::PgPool;

use common::{catalog, engine, output, production, task, working};

#[sqlx::test(migrations = "../db/migrations")]
async fn test_output_paths_per_type(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;
    let cat = catalog(&pool).await;
    let task = task(&pool, &prod.shot, cat.animation_type_id).await;

    let cache = engine
        .create_output_file(&output(task.id, cat.cache_id, cat.person_id))
        .await
        .unwrap();
    let render = engine
        .create_output_file(&output(task.id, cat.render_id, cat.person_id))
        .await
        .unwrap();

    assert_eq!(cache.revision, 1);
    assert_eq!(render.revision, 1);
    assert_eq!(cache.path, "/productions/output/Alpha/shots/E01/S01/SH01/Animation/Cache");
    assert_eq!(cache.file_name, "Alpha_E01_S01_SH01_Animation_Cache_main.v001.abc");
    assert_ne!(cache.full_path(), render.full_path());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_instance_outputs_count_separately(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;
    let cat = catalog(&pool).await;
    let task = task(&pool, &prod.shot, cat.animation_type_id).await;

    let first = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();
    let second = engine
        .add_instance(prod.rabbit.id, prod.shot.id, None)
        .await
        .unwrap();

    let for_instance = |instance_id| CreateOutputFile {
        asset_instance_id: Some(instance_id),
        ..output(task.id, cat.cache_id, cat.person_id)
    };

    let plain = engine
        .create_output_file(&output(task.id, cat.cache_id, cat.person_id))
        .await
        .unwrap();
    let a1 = engine
        .create_output_file(&for_instance(first.instance.id))
        .await
        .unwrap();
    let a2 = engine
        .create_output_file(&for_instance(first.instance.id))
        .await
        .unwrap();
    let b1 = engine
        .create_output_file(&for_instance(second.instance.id))
        .await
        .unwrap();

    assert_eq!(
        [plain.revision, a1.revision, a2.revision, b1.revision],
        [1, 1, 2, 1]
    );
    assert!(a1.path.ends_with("/Cache/Characters/Rabbit/0001"), "{}", a1.path);
    assert!(b1.file_name.contains("_Rabbit_0002_main.v001"), "{}", b1.file_name);

    let unique: HashSet<String> = [&plain, &a1, &a2, &b1].iter().map(|f| f.full_path()).collect();
    assert_eq!(unique.len(), 4);

    let resolved = engine
        .resolve_path_for(FileRevisionRef::Output(b1.id))
        .await
        .unwrap();
    assert_eq!(resolved.full_path(), b1.full_path());
}

/// An instance output named `main` and a plain output whose name spells out
/// the instance must both be stored, at different paths.
async fn assert_look_alike_outputs_coexist(pool: &PgPool, file_tree: &str) {
    let engine = engine(pool);
    let prod = production(&engine, file_tree).await;
    let cat = catalog(pool).await;
    let task = task(pool, &prod.shot, cat.animation_type_id).await;
    let instance = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();

    let placed = engine
        .create_output_file(&CreateOutputFile {
            asset_instance_id: Some(instance.instance.id),
            ..output(task.id, cat.cache_id, cat.person_id)
        })
        .await
        .unwrap();
    let plain = engine
        .create_output_file(&CreateOutputFile {
            name: Some("Characters_Rabbit_0001_main".to_string()),
            ..output(task.id, cat.cache_id, cat.person_id)
        })
        .await
        .unwrap();

    assert_eq!((placed.revision, plain.revision), (1, 1));
    assert_ne!(placed.full_path(), plain.full_path(), "{file_tree}");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_look_alike_outputs_coexist_default(pool: PgPool) {
    assert_look_alike_outputs_coexist(&pool, "default").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_look_alike_outputs_coexist_simple(pool: PgPool) {
    assert_look_alike_outputs_coexist(&pool, "simple").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_look_alike_outputs_coexist_no_preview(pool: PgPool) {
    assert_look_alike_outputs_coexist(&pool, "no_preview").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_dotted_representation_rejected(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;
    let cat = catalog(&pool).await;
    let task = task(&pool, &prod.shot, cat.animation_type_id).await;

    let result = engine
        .create_output_file(&CreateOutputFile {
            representation: Some("tar.gz".to_string()),
            ..output(task.id, cat.cache_id, cat.person_id)
        })
        .await;
    assert_matches!(result, Err(PipelineError::Core(CoreError::Validation(_))));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_instance_must_belong_to_task_entity(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;
    let cat = catalog(&pool).await;
    let task = task(&pool, &prod.shot, cat.animation_type_id).await;

    let elsewhere = engine
        .get_or_create_instance(prod.rabbit.id, prod.shot_two.id)
        .await
        .unwrap();
    let input = CreateOutputFile {
        asset_instance_id: Some(elsewhere.instance.id),
        ..output(task.id, cat.cache_id, cat.person_id)
    };
    assert_matches!(
        engine.create_output_file(&input).await,
        Err(PipelineError::Core(CoreError::InvalidHierarchy(_)))
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_removed_instance_rejects_new_outputs(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;
    let cat = catalog(&pool).await;
    let task = task(&pool, &prod.shot, cat.animation_type_id).await;

    let instance = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();
    let input = CreateOutputFile {
        asset_instance_id: Some(instance.instance.id),
        ..output(task.id, cat.cache_id, cat.person_id)
    };
    let before = engine.create_output_file(&input).await.unwrap();
    engine.remove_instance(instance.instance.id).await.unwrap();

    assert_matches!(
        engine.create_output_file(&input).await,
        Err(PipelineError::Core(CoreError::Validation(_)))
    );
    // Existing outputs still resolve.
    let resolved = engine
        .resolve_path_for(FileRevisionRef::Output(before.id))
        .await
        .unwrap();
    assert_eq!(resolved.full_path(), before.full_path());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_source_file_must_share_task(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;
    let cat = catalog(&pool).await;
    let other_task = task(&pool, &prod.shot_two, cat.animation_type_id).await;
    let task = task(&pool, &prod.shot, cat.animation_type_id).await;

    let source = engine
        .create_working_file(&working(task.id, cat.blender_id, cat.person_id))
        .await
        .unwrap();
    let foreign = engine
        .create_working_file(&working(other_task.id, cat.blender_id, cat.person_id))
        .await
        .unwrap();

    let linked = engine
        .create_output_file(&CreateOutputFile {
            source_file_id: Some(source.id),
            ..output(task.id, cat.cache_id, cat.person_id)
        })
        .await
        .unwrap();
    assert_eq!(linked.source_file_id, Some(source.id));

    assert_matches!(
        engine
            .create_output_file(&CreateOutputFile {
                source_file_id: Some(foreign.id),
                ..output(task.id, cat.cache_id, cat.person_id)
            })
            .await,
        Err(PipelineError::Core(CoreError::Validation(_)))
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_asset_outputs_and_updates(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;
    let cat = catalog(&pool).await;
    let task = task(&pool, &prod.rabbit, cat.animation_type_id).await;

    let file = engine
        .create_output_file(&CreateOutputFile {
            representation: None,
            ..output(task.id, cat.cache_id, cat.person_id)
        })
        .await
        .unwrap();
    assert_eq!(
        file.full_path(),
        "/productions/output/Alpha/assets/Characters/Rabbit/Animation/Cache/\
         Alpha_Characters_Rabbit_Animation_Cache_main.v001"
    );

    assert_eq!(
        engine
            .peek_next_output_revision(task.id, cat.cache_id, None, None)
            .await
            .unwrap(),
        2
    );

    let updated = engine
        .update_output_file(
            file.id,
            &UpdateOutputFile {
                comment: None,
                file_status_id: Some(FileStatus::Approved.id()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.file_status_id, FileStatus::Approved.id());
    assert_eq!(updated.full_path(), file.full_path());

    assert_matches!(
        engine.update_output_file(424_242, &UpdateOutputFile::default()).await,
        Err(PipelineError::Core(CoreError::NotFound { entity: "OutputFile", .. }))
    );
    assert_eq!(engine.list_output_files(task.id).await.unwrap().len(), 1);
}
