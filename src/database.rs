use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

use crate::models::{Category, NewCategory, NewTask, Priority, SeedData, Task};
use crate::utils;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Duplicate {entity} id in seed data: {id}")]
    DuplicateSeedId { entity: &'static str, id: i64 },
}

const TASK_COLUMNS: &str =
    "id, title, description, due_date, priority, category_id, completed, created_at, completed_at";

const CATEGORY_COLUMNS: &str = "id, name, color, task_count";

/// In-memory SQLite backing for the task and category collections.
///
/// Nothing is written to disk: every `Database` starts empty and is gone when dropped.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a fresh in-memory database and initialize the schema
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        // AUTOINCREMENT keeps ids monotonic: a deleted id is never handed out again
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                color           TEXT NOT NULL,
                task_count      INTEGER NOT NULL DEFAULT 0,
                position        INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        // category_id is deliberately not a foreign key: deleting a category leaves its tasks dangling
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                due_date        TEXT,
                priority        TEXT NOT NULL DEFAULT 'medium',
                category_id     INTEGER,
                completed       INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL,
                completed_at    TEXT,
                position        INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_category_id ON tasks(category_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_position ON tasks(position)",
            [],
        )?;

        Ok(())
    }

    /// Load seed records, keeping their order. Ids come from the seed data.
    pub fn seed(&self, seed: &SeedData) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;

        for (position, category) in seed.categories.iter().enumerate() {
            if Self::exists(&tx, "categories", category.id)? {
                return Err(DatabaseError::DuplicateSeedId { entity: "category", id: category.id });
            }
            tx.execute(
                "INSERT INTO categories (id, name, color, task_count, position)
                 VALUES (?1, ?2, ?3, 0, ?4)",
                rusqlite::params![category.id, category.name, category.color, position as i64],
            )?;
        }

        for (position, task) in seed.tasks.iter().enumerate() {
            if Self::exists(&tx, "tasks", task.id)? {
                return Err(DatabaseError::DuplicateSeedId { entity: "task", id: task.id });
            }
            // Seed records may predate the completion invariant
            let mut task = task.clone();
            let created_at = task.created_at;
            task.settle_completion(created_at);

            tx.execute(
                "INSERT INTO tasks (id, title, description, due_date, priority, category_id, completed, created_at, completed_at, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    task.id,
                    task.title,
                    task.description,
                    task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    task.priority.as_str(),
                    task.category_id,
                    if task.completed { 1 } else { 0 },
                    task.created_at.to_rfc3339(),
                    task.completed_at.map(|t| t.to_rfc3339()),
                    position as i64
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn exists(conn: &Connection, table: &str, id: i64) -> Result<bool, DatabaseError> {
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE id = ?1"),
            rusqlite::params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Insert a task at the front of the collection and return it with its new id
    pub fn insert_task(&self, new_task: NewTask, now: DateTime<Utc>) -> Result<Task, DatabaseError> {
        let min_position: Option<i64> =
            self.conn.query_row("SELECT MIN(position) FROM tasks", [], |row| row.get(0))?;
        let position = min_position.map(|p| p - 1).unwrap_or(0);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tasks (title, description, due_date, priority, category_id, completed, created_at, completed_at, position)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, NULL, ?7)",
            rusqlite::params![
                new_task.title,
                new_task.description.clone().unwrap_or_default(),
                new_task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                new_task.priority.unwrap_or_default().as_str(),
                new_task.category_id,
                now.to_rfc3339(),
                position
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Task::from_new(id, new_task, now))
    }

    /// Helper function to map a row to a Task
    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        let due_date: Option<String> = row.get(3)?;
        let priority: String = row.get(4)?;
        let created_at: String = row.get(7)?;
        let completed_at: Option<String> = row.get(8)?;

        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            due_date: due_date.as_deref().and_then(utils::parse_due_date),
            priority: Priority::parse(&priority).unwrap_or(Priority::Low),
            category_id: row.get(5)?,
            completed: row.get::<_, i64>(6)? != 0,
            created_at: parse_timestamp(7, &created_at)?,
            completed_at: completed_at.map(|t| parse_timestamp(8, &t)).transpose()?,
        })
    }

    /// Get all tasks in collection order (most recently created first, then seed order)
    pub fn get_all_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY position ASC, id ASC"
        ))?;
        let tasks = stmt.query_map([], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    /// Get a single task by ID
    pub fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"
        ))?;

        stmt.query_row(rusqlite::params![id], Self::row_to_task)
            .optional()
            .map_err(DatabaseError::from)
    }

    /// Overwrite a stored task. Returns false if no task has that id.
    pub fn update_task(&self, task: &Task) -> Result<bool, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, due_date = ?3, priority = ?4,
             category_id = ?5, completed = ?6, completed_at = ?7 WHERE id = ?8",
            rusqlite::params![
                task.title,
                task.description,
                task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                task.priority.as_str(),
                task.category_id,
                if task.completed { 1 } else { 0 },
                task.completed_at.map(|t| t.to_rfc3339()),
                task.id
            ],
        )?;
        tx.commit()?;
        Ok(changed > 0)
    }

    /// Delete a task by ID. Returns false if no task has that id.
    pub fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(changed > 0)
    }

    /// Insert a category at the end of the collection and return it with its new id
    pub fn insert_category(&self, new_category: NewCategory) -> Result<Category, DatabaseError> {
        let max_position: Option<i64> =
            self.conn.query_row("SELECT MAX(position) FROM categories", [], |row| row.get(0))?;
        let position = max_position.map(|p| p + 1).unwrap_or(0);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO categories (name, color, task_count, position) VALUES (?1, ?2, 0, ?3)",
            rusqlite::params![new_category.name, new_category.color, position],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Category {
            id,
            name: new_category.name,
            color: new_category.color,
            task_count: 0,
        })
    }

    fn row_to_category(row: &rusqlite::Row) -> Result<Category, rusqlite::Error> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            task_count: row.get::<_, i64>(3)?.max(0) as usize,
        })
    }

    /// Get all categories in creation order
    pub fn get_all_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY position ASC, id ASC"
        ))?;
        let categories = stmt.query_map([], Self::row_to_category)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get a single category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"
        ))?;

        stmt.query_row(rusqlite::params![id], Self::row_to_category)
            .optional()
            .map_err(DatabaseError::from)
    }

    /// Overwrite a stored category. Returns false if no category has that id.
    pub fn update_category(&self, category: &Category) -> Result<bool, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE categories SET name = ?1, color = ?2, task_count = ?3 WHERE id = ?4",
            rusqlite::params![
                category.name,
                category.color,
                category.task_count as i64,
                category.id
            ],
        )?;
        tx.commit()?;
        Ok(changed > 0)
    }

    /// Delete a category by ID. Tasks that referenced it are left untouched.
    pub fn delete_category(&self, id: i64) -> Result<bool, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute("DELETE FROM categories WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(changed > 0)
    }
}

fn parse_timestamp(column: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
        })
}
