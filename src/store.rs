//! Asynchronous entity store.
//!
//! `Store` wraps the in-memory [`Database`] and behaves like a remote service: every call
//! waits for the configured latency before touching the data, and can be told to fail the
//! next few calls to simulate a flaky network. The database lock is only taken after the
//! delay, never across an await point.

use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::database::{Database, DatabaseError};
use crate::models::{Category, CategoryPatch, NewCategory, NewTask, SeedData, Task, TaskPatch};

/// Which collection an operation targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Task,
    Category,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Task => f.write_str("Task"),
            Entity::Category => f.write_str("Category"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: i64 },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl StoreError {
    /// Transient failures may succeed if the caller tries again; NotFound never will
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Simulated round-trip time per collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub tasks: Duration,
    pub categories: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Self {
            tasks: Duration::ZERO,
            categories: Duration::ZERO,
        }
    }

    pub fn from_millis(tasks: u64, categories: u64) -> Self {
        Self {
            tasks: Duration::from_millis(tasks),
            categories: Duration::from_millis(categories),
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::from_millis(300, 250)
    }
}

/// Handle to the task and category collections. Clones share the same data.
#[derive(Clone)]
pub struct Store {
    db: Arc<Mutex<Database>>,
    latency: Latency,
    pending_failures: Arc<AtomicU32>,
}

impl Store {
    /// Create an empty store
    pub fn new(latency: Latency) -> Result<Self, StoreError> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            latency,
            pending_failures: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Create a store pre-populated with seed data
    pub fn seeded(seed: &SeedData, latency: Latency) -> Result<Self, StoreError> {
        let store = Self::new(latency)?;
        store.with_db(|db| db.seed(seed))?;
        debug!(
            tasks = seed.tasks.len(),
            categories = seed.categories.len(),
            "seeded store"
        );
        Ok(store)
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    /// Make the next `count` operations fail with [`StoreError::Unavailable`]
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Wait out the simulated latency, then consume an injected failure if one is pending
    async fn round_trip(&self, delay: Duration) -> Result<(), StoreError> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failed = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            warn!("simulated network failure");
            return Err(StoreError::Unavailable("simulated network failure".to_string()));
        }
        Ok(())
    }

    fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> Result<T, DatabaseError>,
    ) -> Result<T, StoreError> {
        let db = self
            .db
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(f(&*db)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.round_trip(self.latency.tasks).await?;
        let tasks = self.with_db(|db| db.get_all_tasks())?;
        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_task(&self, id: i64) -> Result<Task, StoreError> {
        self.round_trip(self.latency.tasks).await?;
        self.with_db(|db| db.get_task(id))?
            .ok_or(StoreError::NotFound { entity: Entity::Task, id })
    }

    /// Create a task. Missing fields take their defaults; the store assigns id and timestamps.
    #[tracing::instrument(skip(self, new_task), fields(title = %new_task.title))]
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        self.round_trip(self.latency.tasks).await?;
        let now = Utc::now();
        let task = self.with_db(|db| db.insert_task(new_task, now))?;
        debug!(id = task.id, "created task");
        Ok(task)
    }

    /// Merge `patch` into the stored task and return the result
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_task(&self, id: i64, patch: TaskPatch) -> Result<Task, StoreError> {
        self.round_trip(self.latency.tasks).await?;
        let now = Utc::now();
        let updated = self.with_db(|db| {
            let Some(mut task) = db.get_task(id)? else {
                return Ok(None);
            };
            task.apply_patch(patch, now);
            db.update_task(&task)?;
            Ok(Some(task))
        })?;

        match updated {
            Some(task) => {
                debug!(completed = task.completed, "updated task");
                Ok(task)
            }
            None => Err(StoreError::NotFound { entity: Entity::Task, id }),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: i64) -> Result<bool, StoreError> {
        self.round_trip(self.latency.tasks).await?;
        if self.with_db(|db| db.delete_task(id))? {
            debug!("deleted task");
            Ok(true)
        } else {
            Err(StoreError::NotFound { entity: Entity::Task, id })
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_all_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.round_trip(self.latency.categories).await?;
        let categories = self.with_db(|db| db.get_all_categories())?;
        debug!(count = categories.len(), "loaded categories");
        Ok(categories)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_category(&self, id: i64) -> Result<Category, StoreError> {
        self.round_trip(self.latency.categories).await?;
        self.with_db(|db| db.get_category(id))?
            .ok_or(StoreError::NotFound { entity: Entity::Category, id })
    }

    /// Create a category with a zero task count
    #[tracing::instrument(skip(self, new_category), fields(name = %new_category.name))]
    pub async fn create_category(&self, new_category: NewCategory) -> Result<Category, StoreError> {
        self.round_trip(self.latency.categories).await?;
        let category = self.with_db(|db| db.insert_category(new_category))?;
        debug!(id = category.id, "created category");
        Ok(category)
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update_category(
        &self,
        id: i64,
        patch: CategoryPatch,
    ) -> Result<Category, StoreError> {
        self.round_trip(self.latency.categories).await?;
        self.with_db(|db| {
            let Some(mut category) = db.get_category(id)? else {
                return Ok(None);
            };
            category.apply_patch(patch);
            db.update_category(&category)?;
            Ok(Some(category))
        })?
        .ok_or(StoreError::NotFound { entity: Entity::Category, id })
    }

    /// Delete a category. Its tasks keep their (now dangling) category id.
    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: i64) -> Result<bool, StoreError> {
        self.round_trip(self.latency.categories).await?;
        if self.with_db(|db| db.delete_category(id))? {
            debug!("deleted category");
            Ok(true)
        } else {
            Err(StoreError::NotFound { entity: Entity::Category, id })
        }
    }
}
