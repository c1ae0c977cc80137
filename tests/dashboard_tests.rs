mod common;

use common::{date, seeded_store};
use taskdeck::models::{CategoryPatch, NewTask, TaskPatch};
use taskdeck::validation::{self, ValidationError};
use taskdeck::{Dashboard, DashboardError, SortKey, StatusFilter, ViewState};

fn today() -> chrono::NaiveDate {
    date(2026, 3, 4)
}

async fn loaded() -> Dashboard {
    let mut dashboard = Dashboard::new(seeded_store(), ViewState::default());
    dashboard.load().await.unwrap();
    dashboard
}

#[tokio::test]
async fn load_can_be_retried_after_a_failure() {
    let store = seeded_store();
    store.fail_next(1);
    let mut dashboard = Dashboard::new(store, ViewState::default());

    let err = dashboard.load().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(dashboard.tasks().is_empty());

    dashboard.load().await.unwrap();
    assert_eq!(dashboard.tasks().len(), 8);
    assert_eq!(dashboard.categories().len(), 2);
}

#[tokio::test]
async fn failed_reload_keeps_previous_data() {
    let mut dashboard = loaded().await;
    dashboard.store().fail_next(1);
    assert!(dashboard.load().await.is_err());
    assert_eq!(dashboard.tasks().len(), 8);
}

#[tokio::test]
async fn invalid_input_never_reaches_the_store() {
    let mut dashboard = loaded().await;
    // A store call would consume this failure
    dashboard.store().fail_next(1);

    let err = dashboard.create_task(NewTask::new("   "), today()).await.unwrap_err();
    assert!(matches!(err, DashboardError::Validation(ValidationError::EmptyTitle)));
    assert!(!err.is_retryable());

    let mut past = NewTask::new("Too late");
    past.due_date = Some(date(2026, 3, 3));
    let err = dashboard.create_task(past, today()).await.unwrap_err();
    assert!(matches!(err, DashboardError::Validation(ValidationError::PastDueDate { .. })));

    let err = dashboard.create_category(" ", None).await.unwrap_err();
    assert!(matches!(err, DashboardError::Validation(ValidationError::EmptyCategoryName)));

    // Still pending, so the store was never called
    assert!(dashboard.load().await.is_err());
    assert_eq!(dashboard.tasks().len(), 8);
}

#[tokio::test]
async fn create_trims_title_and_prepends() {
    let mut dashboard = loaded().await;
    let task = dashboard
        .create_task(NewTask::new("  Plan trip  "), today())
        .await
        .unwrap();

    assert_eq!(task.title, "Plan trip");
    assert_eq!(dashboard.tasks()[0].id, task.id);
    assert_eq!(dashboard.derived().total_tasks, 9);
}

#[tokio::test]
async fn create_inside_a_category_joins_it() {
    let mut dashboard = loaded().await;
    dashboard.set_category(Some(2));

    let mut new_task = NewTask::new("Mow lawn");
    new_task.category_id = Some(1);
    let task = dashboard.create_task(new_task, today()).await.unwrap();
    assert_eq!(task.category_id, Some(2));

    let derived = dashboard.derived();
    assert!(derived.tasks.iter().any(|t| t.id == task.id));
    assert_eq!(derived.title(), "Home");
}

#[tokio::test]
async fn toggle_flips_completion() {
    let mut dashboard = loaded().await;

    let task = dashboard.toggle_complete(1).await.unwrap();
    assert!(task.completed);
    assert!(task.completed_at.is_some());

    let task = dashboard.toggle_complete(1).await.unwrap();
    assert!(!task.completed);
    assert!(task.completed_at.is_none());
    assert_eq!(dashboard.tasks().iter().find(|t| t.id == 1), Some(&task));

    let err = dashboard.toggle_complete(404).await.unwrap_err();
    assert!(matches!(err, DashboardError::Store(ref e) if e.is_not_found()));
}

#[tokio::test]
async fn badges_follow_mutations() {
    let mut dashboard = loaded().await;
    let work = |d: &Dashboard| d.derived().categories[0].task_count;
    assert_eq!(work(&dashboard), 1);

    dashboard.toggle_complete(7).await.unwrap();
    assert_eq!(work(&dashboard), 2);

    dashboard.delete_task(1).await.unwrap();
    assert_eq!(work(&dashboard), 1);
    assert!(dashboard.tasks().iter().all(|t| t.id != 1));
}

#[tokio::test]
async fn update_validates_only_given_fields() {
    let mut dashboard = loaded().await;

    let err = dashboard
        .update_task(1, TaskPatch::default(), today())
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Validation(ValidationError::EmptyPatch)));

    let task = dashboard
        .update_task(
            1,
            TaskPatch { title: Some(" Team sync ".into()), ..Default::default() },
            today(),
        )
        .await
        .unwrap();
    assert_eq!(task.title, "Team sync");
    assert_eq!(dashboard.tasks()[0].title, "Team sync");
}

#[tokio::test]
async fn deleting_the_active_category_resets_scope() {
    let mut dashboard = loaded().await;
    dashboard.set_category(Some(1));
    dashboard.set_status(StatusFilter::Active);

    dashboard.delete_category(1).await.unwrap();
    assert_eq!(dashboard.view_state().category_id, None);
    assert_eq!(dashboard.view_state().status, StatusFilter::Active);
    assert_eq!(dashboard.categories().len(), 1);
    // Its tasks are still there
    assert_eq!(dashboard.tasks().len(), 8);
}

#[tokio::test]
async fn deleting_another_category_keeps_scope() {
    let mut dashboard = loaded().await;
    dashboard.set_category(Some(1));
    dashboard.delete_category(2).await.unwrap();
    assert_eq!(dashboard.view_state().category_id, Some(1));
}

#[tokio::test]
async fn new_categories_cycle_the_palette() {
    let mut dashboard = loaded().await;
    let category = dashboard.create_category("Errands", None).await.unwrap();
    assert_eq!(category.color, validation::palette_color(2));
    assert_eq!(dashboard.categories().last(), Some(&category));

    let renamed = dashboard
        .update_category(category.id, CategoryPatch { name: Some("Chores".into()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(renamed.name, "Chores");
    assert_eq!(dashboard.categories().last().map(|c| c.name.as_str()), Some("Chores"));

    let err = dashboard
        .create_category("Bad", Some("mauve".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Validation(ValidationError::InvalidColor(_))));
}

#[tokio::test]
async fn view_setters_drive_the_derived_page() {
    let mut dashboard = loaded().await;
    dashboard.set_search("meet");
    dashboard.set_sort_key(SortKey::Title);
    let ids: Vec<i64> = dashboard.derived().tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2]);

    dashboard.set_status(StatusFilter::Completed);
    let ids: Vec<i64> = dashboard.derived().tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2]);
}
