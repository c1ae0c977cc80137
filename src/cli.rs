use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::dashboard::{Dashboard, DashboardError};
use crate::models::{CategoryPatch, NewTask, Priority, TaskPatch};
use crate::query::{SortKey, StatusFilter};
use crate::render;
use crate::utils::parse_date;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Tasks grouped into categories, filtered, sorted and counted")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config)
    #[arg(long)]
    pub dev: bool,

    /// Seed data file (JSON), overriding the configured one
    #[arg(long)]
    pub seed: Option<String>,

    /// Disable colors
    #[arg(long)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the task list (default if no subcommand)
    List {
        /// Only tasks in this category
        #[arg(long)]
        category: Option<i64>,
        /// Case-insensitive text to look for in title or description
        #[arg(long)]
        search: Option<String>,
        /// all, active or completed
        #[arg(long)]
        status: Option<String>,
        /// dueDate, priority, created or title
        #[arg(long)]
        sort: Option<String>,
    },
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        desc: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// low, medium, high or urgent
        #[arg(long)]
        priority: Option<String>,
        /// Category id
        #[arg(long)]
        category: Option<i64>,
    },
    /// Change fields of an existing task
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long, conflicts_with = "clear_category")]
        category: Option<i64>,
        /// Remove the task from its category
        #[arg(long)]
        clear_category: bool,
    },
    /// Mark a task completed, or active again if it already is
    Toggle { id: i64 },
    /// Delete a task
    Delete { id: i64 },
    /// List categories with their open-task counts
    Categories,
    /// Create a category
    AddCategory {
        name: String,
        /// Hex color (#RRGGBB); picked from the palette when omitted
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename a category
    RenameCategory { id: i64, name: String },
    /// Delete a category (its tasks are kept)
    DeleteCategory { id: i64 },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::List {
            category: None,
            search: None,
            status: None,
            sort: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Unknown priority '{0}': expected low, medium, high or urgent")]
    InvalidPriority(String),
}

fn parse_due(due: &str) -> Result<NaiveDate, CliError> {
    parse_date(due)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", due, e)))
}

fn parse_priority(priority: &str) -> Result<Priority, CliError> {
    Priority::parse(priority).ok_or_else(|| CliError::InvalidPriority(priority.to_string()))
}

fn render_current_page(dashboard: &Dashboard, today: NaiveDate, styled: bool) -> String {
    render::render_page(&dashboard.derived(), dashboard.view_state(), today, styled)
}

/// Run one command against a loaded dashboard and return what should be printed
pub async fn run_command(
    command: Commands,
    dashboard: &mut Dashboard,
    today: NaiveDate,
    styled: bool,
) -> Result<String, CliError> {
    match command {
        Commands::List { category, search, status, sort } => {
            handle_list(dashboard, category, search, status, sort, today, styled)
        }
        Commands::Add { title, desc, due, priority, category } => {
            handle_add(dashboard, title, desc, due, priority, category, today, styled).await
        }
        Commands::Edit {
            id,
            title,
            desc,
            due,
            clear_due,
            priority,
            category,
            clear_category,
        } => {
            let patch = TaskPatch {
                title,
                description: desc,
                due_date: match (due, clear_due) {
                    (_, true) => Some(None),
                    (Some(due), false) => Some(Some(parse_due(&due)?)),
                    (None, false) => None,
                },
                priority: priority.as_deref().map(parse_priority).transpose()?,
                category_id: match (category, clear_category) {
                    (_, true) => Some(None),
                    (Some(category), false) => Some(Some(category)),
                    (None, false) => None,
                },
                ..Default::default()
            };
            let task = dashboard.update_task(id, patch, today).await?;
            Ok(format!(
                "Task updated successfully (ID: {})\n\n{}",
                task.id,
                render_current_page(dashboard, today, styled)
            ))
        }
        Commands::Toggle { id } => {
            let task = dashboard.toggle_complete(id).await?;
            let message = if task.completed {
                "Task completed!"
            } else {
                "Task marked as active"
            };
            Ok(format!(
                "{} (ID: {})\n\n{}",
                message,
                task.id,
                render_current_page(dashboard, today, styled)
            ))
        }
        Commands::Delete { id } => {
            dashboard.delete_task(id).await?;
            Ok(format!(
                "Task deleted successfully (ID: {})\n\n{}",
                id,
                render_current_page(dashboard, today, styled)
            ))
        }
        Commands::Categories => Ok(render::render_sidebar(&dashboard.derived(), styled)),
        Commands::AddCategory { name, color } => {
            let category = dashboard.create_category(&name, color).await?;
            Ok(format!(
                "Category created successfully (ID: {})\n\n{}",
                category.id,
                render::render_sidebar(&dashboard.derived(), styled)
            ))
        }
        Commands::RenameCategory { id, name } => {
            let patch = CategoryPatch {
                name: Some(name),
                ..Default::default()
            };
            let category = dashboard.update_category(id, patch).await?;
            Ok(format!(
                "Category renamed successfully (ID: {})\n\n{}",
                category.id,
                render::render_sidebar(&dashboard.derived(), styled)
            ))
        }
        Commands::DeleteCategory { id } => {
            dashboard.delete_category(id).await?;
            Ok(format!(
                "Category deleted successfully (ID: {})\n\n{}",
                id,
                render::render_sidebar(&dashboard.derived(), styled)
            ))
        }
    }
}

/// Handle the list command: apply the given view options on top of the configured defaults
fn handle_list(
    dashboard: &mut Dashboard,
    category: Option<i64>,
    search: Option<String>,
    status: Option<String>,
    sort: Option<String>,
    today: NaiveDate,
    styled: bool,
) -> Result<String, CliError> {
    if category.is_some() {
        dashboard.set_category(category);
    }
    if let Some(search) = search {
        dashboard.set_search(search);
    }
    if let Some(status) = status {
        dashboard.set_status(StatusFilter::parse(&status));
    }
    if let Some(sort) = sort {
        dashboard.set_sort_key(SortKey::parse(&sort));
    }
    Ok(render_current_page(dashboard, today, styled))
}

/// Handle the add command
#[allow(clippy::too_many_arguments)]
async fn handle_add(
    dashboard: &mut Dashboard,
    title: String,
    desc: Option<String>,
    due: Option<String>,
    priority: Option<String>,
    category: Option<i64>,
    today: NaiveDate,
    styled: bool,
) -> Result<String, CliError> {
    // Parse due date if provided
    let due_date = due.as_deref().map(parse_due).transpose()?;
    let priority = priority.as_deref().map(parse_priority).transpose()?;

    let new_task = NewTask {
        title,
        description: desc,
        due_date,
        priority,
        category_id: category,
    };
    let task = dashboard.create_task(new_task, today).await?;

    Ok(format!(
        "Task created successfully (ID: {})\n\n{}",
        task.id,
        render_current_page(dashboard, today, styled)
    ))
}
