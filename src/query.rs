//! Task query engine.
//!
//! Pure functions that turn the full task and category collections plus the current
//! view-state into what a dashboard shows: the visible tasks in display order, the
//! all/active/completed tab counts, and per-category open-task badges. Nothing here
//! touches the store, suspends, or fails.

use chrono::{Datelike, Duration, NaiveDate};
use feruca::Collator;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::models::{Category, Task};
use crate::utils;

/// Which tasks the status tabs let through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    /// Unknown names fall back to `All`
    pub fn parse(s: &str) -> StatusFilter {
        match s.trim().to_lowercase().as_str() {
            "active" => StatusFilter::Active,
            "completed" => StatusFilter::Completed,
            _ => StatusFilter::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

/// Display ordering for the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
    Created,
    Title,
    /// Keep collection order
    Unsorted,
}

impl SortKey {
    /// Parse a sort key name. Unknown names map to `Unsorted`, which leaves order alone.
    pub fn parse(s: &str) -> SortKey {
        match s.trim() {
            "dueDate" | "due-date" | "due_date" | "due" => SortKey::DueDate,
            "priority" => SortKey::Priority,
            "created" | "createdAt" => SortKey::Created,
            "title" => SortKey::Title,
            _ => SortKey::Unsorted,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::DueDate => "dueDate",
            SortKey::Priority => "priority",
            SortKey::Created => "created",
            SortKey::Title => "title",
            SortKey::Unsorted => "unsorted",
        }
    }
}

/// Category, search and status restrictions applied to the task list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub category_id: Option<i64>,
    pub search_text: String,
    pub status: StatusFilter,
}

/// Everything the derived view depends on besides the data itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub category_id: Option<i64>,
    pub search_text: String,
    pub status: StatusFilter,
    pub sort_key: SortKey,
}

impl ViewState {
    pub fn scope(&self) -> Scope {
        Scope {
            category_id: self.category_id,
            search_text: self.search_text.clone(),
            status: self.status,
        }
    }
}

/// Case-insensitive substring match on title or description
pub fn matches_search(task: &Task, query: &str) -> bool {
    let query_lower = query.to_lowercase();
    task.title.to_lowercase().contains(&query_lower)
        || task.description.to_lowercase().contains(&query_lower)
}

/// Keep the tasks that pass category, search and status restrictions, in input order
pub fn filter_tasks<'a>(tasks: &'a [Task], scope: &Scope) -> Vec<&'a Task> {
    tasks
        .iter()
        // Filter by category
        .filter(|task| match scope.category_id {
            Some(category_id) => task.category_id == Some(category_id),
            None => true,
        })
        // Filter by search text
        .filter(|task| scope.search_text.is_empty() || matches_search(task, &scope.search_text))
        // Filter by completion status
        .filter(|task| scope.status.matches(task))
        .collect()
}

fn compare_due_dates(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}


/// Order tasks for display. The input is left untouched; ties keep their input order.
pub fn sort_tasks<'a>(tasks: &[&'a Task], key: SortKey) -> Vec<&'a Task> {
    let mut sorted = tasks.to_vec();
    match key {
        SortKey::DueDate => sorted.sort_by(|a, b| compare_due_dates(a, b)),
        SortKey::Priority => sorted.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        SortKey::Created => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Title => {
            // Unicode collation: accents sort with their base letter, lowercase before uppercase
            let mut collator = Collator::default();
            sorted.sort_by(|a, b| collator.collate(a.title.as_str(), b.title.as_str()));
        }
        SortKey::Unsorted => {}
    }
    sorted
}

/// Tab counts for the current category scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

/// Count tasks in scope, ignoring search, status and sort.
/// With no category every task is in scope.
pub fn task_counts(tasks: &[Task], category_id: Option<i64>) -> TaskCounts {
    tasks
        .iter()
        .filter(|task| category_id.is_none() || task.category_id == category_id)
        .fold(TaskCounts::default(), |mut counts, task| {
            counts.all += 1;
            if task.completed {
                counts.completed += 1;
            } else {
                counts.active += 1;
            }
            counts
        })
}

/// Number of open tasks in one category, over the whole unfiltered list
pub fn open_count(tasks: &[Task], category_id: i64) -> usize {
    tasks
        .iter()
        .filter(|task| task.category_id == Some(category_id) && task.is_open())
        .count()
}

/// Open-task counts for every category id referenced by an open task
pub fn open_counts(tasks: &[Task]) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for task in tasks.iter().filter(|task| task.is_open()) {
        if let Some(category_id) = task.category_id {
            *counts.entry(category_id).or_insert(0) += 1;
        }
    }
    counts
}

/// Categories with `task_count` replaced by the live open-task count
pub fn categories_with_counts(categories: &[Category], tasks: &[Task]) -> Vec<Category> {
    let counts = open_counts(tasks);
    categories
        .iter()
        .map(|category| Category {
            task_count: counts.get(&category.id).copied().unwrap_or(0),
            ..category.clone()
        })
        .collect()
}

/// Resolve a task's category. Dangling references resolve to `None`.
pub fn category_of<'a>(task: &Task, categories: &'a [Category]) -> Option<&'a Category> {
    let category_id = task.category_id?;
    categories.iter().find(|category| category.id == category_id)
}

/// Everything a dashboard renders, derived from one snapshot of data and view-state
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView<'a> {
    /// Visible tasks in display order
    pub tasks: Vec<&'a Task>,
    pub counts: TaskCounts,
    pub categories: Vec<Category>,
    /// The scoped category, if it exists
    pub current_category: Option<&'a Category>,
    /// Size of the whole task collection, for the "All Tasks" badge
    pub total_tasks: usize,
}

impl DerivedView<'_> {
    /// Heading for the current scope
    pub fn title(&self) -> &str {
        self.current_category
            .map(|category| category.name.as_str())
            .unwrap_or("All Tasks")
    }
}

/// Filter, sort and count in one pass over the latest inputs
pub fn derive<'a>(
    tasks: &'a [Task],
    categories: &'a [Category],
    view: &ViewState,
) -> DerivedView<'a> {
    let filtered = filter_tasks(tasks, &view.scope());
    let current_category = view
        .category_id
        .and_then(|id| categories.iter().find(|category| category.id == id));

    DerivedView {
        tasks: sort_tasks(&filtered, view.sort_key),
        counts: task_counts(tasks, view.category_id),
        categories: categories_with_counts(categories, tasks),
        current_category,
        total_tasks: tasks.len(),
    }
}

/// How a due date reads relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueLabel {
    Today,
    Tomorrow,
    Overdue,
    /// Later this week
    Weekday(chrono::Weekday),
    Date(NaiveDate),
}

impl DueLabel {
    /// Today and overdue dates need attention
    pub fn is_urgent(self) -> bool {
        matches!(self, DueLabel::Today | DueLabel::Overdue)
    }
}

impl fmt::Display for DueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueLabel::Today => f.write_str("Today"),
            DueLabel::Tomorrow => f.write_str("Tomorrow"),
            DueLabel::Overdue => f.write_str("Overdue"),
            DueLabel::Weekday(weekday) => {
                let name = match weekday {
                    chrono::Weekday::Mon => "Monday",
                    chrono::Weekday::Tue => "Tuesday",
                    chrono::Weekday::Wed => "Wednesday",
                    chrono::Weekday::Thu => "Thursday",
                    chrono::Weekday::Fri => "Friday",
                    chrono::Weekday::Sat => "Saturday",
                    chrono::Weekday::Sun => "Sunday",
                };
                f.write_str(name)
            }
            DueLabel::Date(date) => write!(f, "{}", date.format("%b %-d")),
        }
    }
}

/// Classify a due date for display
pub fn due_label(due: NaiveDate, today: NaiveDate) -> DueLabel {
    if due == today {
        DueLabel::Today
    } else if due == today + Duration::days(1) {
        DueLabel::Tomorrow
    } else if due < today {
        DueLabel::Overdue
    } else if utils::start_of_week(due) == utils::start_of_week(today) {
        DueLabel::Weekday(due.weekday())
    } else {
        DueLabel::Date(due)
    }
}
