//! View controller: owns the view-state and local copies of both collections, validates
//! input before it reaches the store, and re-derives the visible page on demand.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::info;

use crate::models::{Category, CategoryPatch, NewCategory, NewTask, Task, TaskPatch};
use crate::query::{self, DerivedView, SortKey, StatusFilter, ViewState};
use crate::store::{Entity, Store, StoreError};
use crate::validation::{self, ValidationError};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DashboardError {
    /// Only transient store failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            DashboardError::Store(e) => e.is_retryable(),
            DashboardError::Validation(_) => false,
        }
    }
}

pub struct Dashboard {
    store: Store,
    tasks: Vec<Task>,
    categories: Vec<Category>,
    view: ViewState,
}

impl Dashboard {
    /// Create a dashboard over `store`. Call [`Dashboard::load`] before reading data.
    pub fn new(store: Store, view: ViewState) -> Self {
        Self {
            store,
            tasks: Vec::new(),
            categories: Vec::new(),
            view,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Fetch both collections. On failure the previous data is kept and the caller may retry.
    pub async fn load(&mut self) -> Result<(), DashboardError> {
        let (tasks, categories) =
            tokio::try_join!(self.store.get_all_tasks(), self.store.get_all_categories())?;
        self.tasks = tasks;
        self.categories = categories;
        info!(
            tasks = self.tasks.len(),
            categories = self.categories.len(),
            "dashboard loaded"
        );
        Ok(())
    }

    pub fn set_category(&mut self, category_id: Option<i64>) {
        self.view.category_id = category_id;
    }

    pub fn set_search(&mut self, search_text: impl Into<String>) {
        self.view.search_text = search_text.into();
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.view.status = status;
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.view.sort_key = sort_key;
    }

    /// Recompute the visible page from the current data and view-state
    pub fn derived(&self) -> DerivedView<'_> {
        query::derive(&self.tasks, &self.categories, &self.view)
    }

    fn replace_task(&mut self, task: Task) {
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        }
    }

    fn replace_category(&mut self, category: Category) {
        if let Some(existing) = self.categories.iter_mut().find(|c| c.id == category.id) {
            *existing = category;
        }
    }

    /// Validate and create a task. Inside a category scope the task joins that category.
    pub async fn create_task(
        &mut self,
        mut new_task: NewTask,
        today: NaiveDate,
    ) -> Result<Task, DashboardError> {
        new_task.title = new_task.title.trim().to_string();
        validation::validate_new_task(&new_task, today)?;

        if let Some(category_id) = self.view.category_id {
            new_task.category_id = Some(category_id);
        }

        let task = self.store.create_task(new_task).await?;
        info!(id = task.id, "task created");
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Validate and apply a partial update
    pub async fn update_task(
        &mut self,
        id: i64,
        mut patch: TaskPatch,
        today: NaiveDate,
    ) -> Result<Task, DashboardError> {
        if let Some(title) = patch.title.take() {
            patch.title = Some(title.trim().to_string());
        }
        validation::validate_task_patch(&patch, today)?;

        let task = self.store.update_task(id, patch).await?;
        info!(id, "task updated");
        self.replace_task(task.clone());
        Ok(task)
    }

    /// Flip a task between completed and active
    pub async fn toggle_complete(&mut self, id: i64) -> Result<Task, DashboardError> {
        let completed = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.completed)
            .ok_or(StoreError::NotFound { entity: Entity::Task, id })?;

        let patch = TaskPatch::completion(!completed, Utc::now());
        let task = self.store.update_task(id, patch).await?;
        info!(id, completed = task.completed, "task toggled");
        self.replace_task(task.clone());
        Ok(task)
    }

    pub async fn delete_task(&mut self, id: i64) -> Result<(), DashboardError> {
        self.store.delete_task(id).await?;
        info!(id, "task deleted");
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    /// Create a category. Without an explicit color the next palette color is used.
    pub async fn create_category(
        &mut self,
        name: &str,
        color: Option<String>,
    ) -> Result<Category, DashboardError> {
        let new_category = NewCategory {
            name: name.trim().to_string(),
            color: color
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| validation::palette_color(self.categories.len()).to_string()),
        };
        validation::validate_new_category(&new_category)?;

        let category = self.store.create_category(new_category).await?;
        info!(id = category.id, "category created");
        self.categories.push(category.clone());
        Ok(category)
    }

    pub async fn update_category(
        &mut self,
        id: i64,
        mut patch: CategoryPatch,
    ) -> Result<Category, DashboardError> {
        if let Some(name) = patch.name.take() {
            patch.name = Some(name.trim().to_string());
        }
        validation::validate_category_patch(&patch)?;

        let category = self.store.update_category(id, patch).await?;
        info!(id, "category updated");
        self.replace_category(category.clone());
        Ok(category)
    }

    /// Delete a category. Its tasks stay, with a dangling category id.
    /// If it was the active scope the view falls back to all tasks.
    pub async fn delete_category(&mut self, id: i64) -> Result<(), DashboardError> {
        self.store.delete_category(id).await?;
        info!(id, "category deleted");
        self.categories.retain(|c| c.id != id);
        if self.view.category_id == Some(id) {
            self.view.category_id = None;
        }
        Ok(())
    }
}
