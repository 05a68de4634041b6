//! Integration tests for breakdown instance numbering and naming.

mod common;

use assert_matches::assert_matches;
use kinetrack_core::error::CoreError;
use kinetrack_pipeline::PipelineError;
use sqlx::PgPool;

use common::{engine, production};

#[sqlx::test(migrations = "../db/migrations")]
async fn test_counters_are_per_target(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;

    let sh01_first = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();
    let sh01_second = engine
        .add_instance(prod.rabbit.id, prod.shot.id, None)
        .await
        .unwrap();
    let sh02_first = engine
        .get_or_create_instance(prod.rabbit.id, prod.shot_two.id)
        .await
        .unwrap();

    assert_eq!(sh01_first.instance.number, 1);
    assert_eq!(sh01_second.instance.number, 2);
    assert_eq!(sh02_first.instance.number, 1);
    assert_eq!(sh01_first.display_name, "Rabbit");
    assert_eq!(sh01_second.display_name, "Rabbit_0002");
    assert_eq!(sh02_first.display_name, "Rabbit");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_or_create_is_idempotent(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;

    let first = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();
    let again = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();
    assert_eq!(first.instance.id, again.instance.id);

    let listed = engine.list_instances(prod.rabbit.id, prod.shot.id, false).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_numbers_are_never_reused(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;

    let one = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();
    let two = engine
        .add_instance(prod.rabbit.id, prod.shot.id, Some("background".to_string()))
        .await
        .unwrap();
    assert_eq!(two.instance.description.as_deref(), Some("background"));

    engine.remove_instance(two.instance.id).await.unwrap();
    let three = engine
        .add_instance(prod.rabbit.id, prod.shot.id, None)
        .await
        .unwrap();
    assert_eq!(three.instance.number, 3);

    // With number 1 gone the lowest active instance is 3.
    engine.remove_instance(one.instance.id).await.unwrap();
    let lowest = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();
    assert_eq!(lowest.instance.number, 3);
    assert_eq!(lowest.display_name, "Rabbit");

    let all = engine.list_instances(prod.rabbit.id, prod.shot.id, true).await.unwrap();
    let names: Vec<&str> = all.iter().map(|i| i.display_name.as_str()).collect();
    assert_eq!(names, ["Rabbit_0001", "Rabbit_0002", "Rabbit"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_removing_everything_starts_past_the_counter(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;

    let one = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();
    engine.remove_instance(one.instance.id).await.unwrap();

    let next = engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();
    assert_eq!(next.instance.number, 2);
    assert_eq!(next.display_name, "Rabbit");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_placement_rules(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;

    assert_matches!(
        engine.get_or_create_instance(prod.rabbit.id, prod.sequence.id).await,
        Err(PipelineError::Core(CoreError::InvalidHierarchy(_)))
    );
    assert_matches!(
        engine.get_or_create_instance(prod.shot.id, prod.shot_two.id).await,
        Err(PipelineError::Core(CoreError::InvalidHierarchy(_)))
    );
    assert_matches!(
        engine.get_or_create_instance(prod.rabbit.id, 424_242).await,
        Err(PipelineError::Core(CoreError::NotFound { .. }))
    );
    assert_matches!(
        engine.remove_instance(424_242).await,
        Err(PipelineError::Core(CoreError::NotFound { entity: "AssetInstance", .. }))
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_listing_checks_the_placement(pool: PgPool) {
    let engine = engine(&pool);
    let prod = production(&engine, "default").await;
    engine.get_or_create_instance(prod.rabbit.id, prod.shot.id).await.unwrap();

    assert_matches!(
        engine.list_instances(prod.rabbit.id, 424_242, false).await,
        Err(PipelineError::Core(CoreError::NotFound { .. }))
    );
    assert_matches!(
        engine.list_instances(prod.shot.id, prod.shot_two.id, false).await,
        Err(PipelineError::Core(CoreError::InvalidHierarchy(_)))
    );
    assert_matches!(
        engine.list_instances(prod.rabbit.id, prod.sequence.id, true).await,
        Err(PipelineError::Core(CoreError::InvalidHierarchy(_)))
    );

    let listed = engine.list_instances(prod.rabbit.id, prod.shot_two.id, false).await.unwrap();
    assert!(listed.is_empty());
}
