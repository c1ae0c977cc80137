mod common;

use common::{empty_store, seeded_store};
use std::time::Duration;
use taskdeck::models::{CategoryPatch, NewCategory, NewTask, Priority, TaskPatch};
use taskdeck::store::Entity;
use taskdeck::{Latency, Store, StoreError};

#[tokio::test]
async fn create_applies_defaults() {
    let store = empty_store();
    let task = store.create_task(NewTask::new("Water plants")).await.unwrap();

    assert_eq!(task.title, "Water plants");
    assert_eq!(task.description, "");
    assert_eq!(task.priority, Priority::Medium);
    assert!(task.due_date.is_none());
    assert!(task.category_id.is_none());
    assert!(!task.completed);
    assert!(task.completed_at.is_none());

    let fetched = store.get_task(task.id).await.unwrap();
    assert_eq!(fetched, task);
}

#[tokio::test]
async fn new_tasks_go_to_the_front() {
    let store = seeded_store();
    let task = store.create_task(NewTask::new("Newest")).await.unwrap();
    let all = store.get_all_tasks().await.unwrap();
    assert_eq!(all[0].id, task.id);
    assert_eq!(all.len(), 9);
    assert_eq!(all[1].id, 1);
}

#[tokio::test]
async fn seed_order_is_preserved() {
    let store = seeded_store();
    let ids: Vec<i64> = store.get_all_tasks().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[tokio::test]
async fn completing_and_reopening_tracks_completed_at() {
    let store = seeded_store();

    let done = store
        .update_task(1, TaskPatch { completed: Some(true), ..Default::default() })
        .await
        .unwrap();
    assert!(done.completed);
    assert!(done.completed_at.is_some());

    let reopened = store
        .update_task(1, TaskPatch { completed: Some(false), ..Default::default() })
        .await
        .unwrap();
    assert!(!reopened.completed);
    assert!(reopened.completed_at.is_none());
    assert_eq!(store.get_task(1).await.unwrap(), reopened);
}

#[tokio::test]
async fn patch_only_touches_given_fields() {
    let store = seeded_store();
    let before = store.get_task(1).await.unwrap();

    let after = store
        .update_task(
            1,
            TaskPatch {
                priority: Some(Priority::Low),
                due_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(after.priority, Priority::Low);
    assert!(after.due_date.is_none());
    assert_eq!(after.title, before.title);
    assert_eq!(after.category_id, before.category_id);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let store = seeded_store();

    let err = store.get_task(404).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: Entity::Task, id: 404 }));
    assert!(!err.is_retryable());

    let err = store.update_task(404, TaskPatch::default()).await.unwrap_err();
    assert!(err.is_not_found());

    let err = store.delete_task(404).await.unwrap_err();
    assert!(err.is_not_found());

    let err = store
        .update_category(404, CategoryPatch { name: Some("X".into()), ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: Entity::Category, .. }));
    assert!(store.delete_category(404).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn ids_are_never_reused() {
    let store = seeded_store();

    let first = store.create_task(NewTask::new("First")).await.unwrap();
    assert_eq!(first.id, 9);
    assert!(store.delete_task(first.id).await.unwrap());

    let second = store.create_task(NewTask::new("Second")).await.unwrap();
    assert_eq!(second.id, 10);
    assert!(store.get_task(first.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn deleting_a_category_keeps_its_tasks() {
    let store = seeded_store();
    assert!(store.delete_category(1).await.unwrap());

    let categories = store.get_all_categories().await.unwrap();
    assert_eq!(categories.len(), 1);

    let task = store.get_task(1).await.unwrap();
    assert_eq!(task.category_id, Some(1));
}

#[tokio::test]
async fn categories_append_with_zero_count() {
    let store = seeded_store();
    let category = store
        .create_category(NewCategory { name: "Errands".into(), color: "#FF5722".into() })
        .await
        .unwrap();

    assert_eq!(category.id, 3);
    assert_eq!(category.task_count, 0);

    let all = store.get_all_categories().await.unwrap();
    assert_eq!(all.last().map(|c| c.id), Some(category.id));

    let renamed = store
        .update_category(3, CategoryPatch { name: Some("Chores".into()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(renamed.name, "Chores");
    assert_eq!(renamed.color, "#FF5722");
}

#[tokio::test]
async fn injected_failures_are_transient() {
    let store = seeded_store();
    store.fail_next(2);

    let err = store.get_all_tasks().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(err.is_retryable());
    assert!(store.create_task(NewTask::new("Lost")).await.is_err());

    // The failed create left nothing behind
    let tasks = store.get_all_tasks().await.unwrap();
    assert_eq!(tasks.len(), 8);
}

#[tokio::test]
async fn clones_share_data() {
    let store = empty_store();
    let other = store.clone();
    other.create_task(NewTask::new("Shared")).await.unwrap();
    assert_eq!(store.get_all_tasks().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn operations_wait_for_latency() {
    let store = Store::new(Latency::from_millis(300, 250)).unwrap();

    let start = tokio::time::Instant::now();
    store.get_all_tasks().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(300));

    let start = tokio::time::Instant::now();
    store.get_all_categories().await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(250));
    assert!(elapsed < Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn concurrent_loads_overlap() {
    let store = Store::new(Latency::default()).unwrap();

    let start = tokio::time::Instant::now();
    let (tasks, categories) =
        tokio::try_join!(store.get_all_tasks(), store.get_all_categories()).unwrap();
    assert!(tasks.is_empty());
    assert!(categories.is_empty());
    assert!(start.elapsed() < Duration::from_millis(550));
}
