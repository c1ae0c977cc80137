use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::utils;

/// Task urgency. Sorting ranks urgent highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    /// Sort rank: urgent=4, high=3, medium=2, low=1
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    /// Parse a priority name, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "Id")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "unranked_priority", deserialize_with = "lenient_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a fresh task from creation input. The id is assigned by the store.
    pub fn from_new(id: i64, new_task: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new_task.title,
            description: new_task.description.unwrap_or_default(),
            due_date: new_task.due_date,
            priority: new_task.priority.unwrap_or_default(),
            category_id: new_task.category_id,
            completed: false,
            created_at: now,
            completed_at: None,
        }
    }

    /// Merge a partial update into this task.
    /// Fields left as `None` in the patch keep their current value.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.settle_completion(now);
    }

    /// Keep `completed_at` in step with `completed`: stamped while completed, cleared otherwise
    pub fn settle_completion(&mut self, fallback: DateTime<Utc>) {
        if self.completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(fallback);
            }
        } else {
            self.completed_at = None;
        }
    }

    pub fn is_open(&self) -> bool {
        !self.completed
    }
}

/// Creation input for a task. Omitted fields take the documented defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub category_id: Option<i64>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial update for a task.
///
/// `None` leaves a field untouched. Clearable fields are doubly optional:
/// `Some(None)` clears the value, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub category_id: Option<Option<i64>>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Patch that marks a task completed (stamped with `now`) or reopens it
    pub fn completion(completed: bool, now: DateTime<Utc>) -> Self {
        Self {
            completed: Some(completed),
            completed_at: Some(completed.then_some(now)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "Id")]
    pub id: i64,
    pub name: String,
    pub color: String,
    /// Cached open-task count. Recomputed by the query engine, never trusted from storage.
    #[serde(default)]
    pub task_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl Category {
    pub fn apply_patch(&mut self, patch: CategoryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }
}

/// Initial contents of the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn unranked_priority() -> Priority {
    Priority::Low
}

// Malformed dates decode as "no due date" rather than failing the whole record
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(utils::parse_due_date))
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(Priority::parse)
        .unwrap_or_else(unranked_priority))
}
