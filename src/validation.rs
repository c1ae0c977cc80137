use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{CategoryPatch, NewCategory, NewTask, TaskPatch};

/// Palette new categories cycle through when no color is given
pub const CATEGORY_PALETTE: &[&str] = &[
    "#5B47E0", "#FF9800", "#4CAF50", "#F44336", "#2196F3", "#9C27B0", "#FF5722",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Task title is required")]
    EmptyTitle,
    #[error("Due date cannot be in the past: {due} is before {today}")]
    PastDueDate { due: NaiveDate, today: NaiveDate },
    #[error("Category name is required")]
    EmptyCategoryName,
    #[error("Invalid color '{0}': expected #RRGGBB or #RGB")]
    InvalidColor(String),
    #[error("Nothing to update")]
    EmptyPatch,
}

/// Parse hex color format (#RRGGBB or #RGB) into its RGB components
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }

    if hex.len() == 6 {
        // Full format: #RRGGBB
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    } else if hex.len() == 3 {
        // Short format: #RGB -> #RRGGBB
        let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
        let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
        let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
        Some((r * 17, g * 17, b * 17))
    } else {
        None
    }
}

/// Palette color for the nth category
pub fn palette_color(index: usize) -> &'static str {
    CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

fn check_due_date(due: Option<NaiveDate>, today: NaiveDate) -> Result<(), ValidationError> {
    match due {
        Some(due) if due < today => Err(ValidationError::PastDueDate { due, today }),
        _ => Ok(()),
    }
}

fn check_color(color: &str) -> Result<(), ValidationError> {
    match parse_hex_color(color) {
        Some(_) => Ok(()),
        None => Err(ValidationError::InvalidColor(color.to_string())),
    }
}

/// Validate task creation input against today's date
pub fn validate_new_task(new_task: &NewTask, today: NaiveDate) -> Result<(), ValidationError> {
    check_title(&new_task.title)?;
    check_due_date(new_task.due_date, today)?;
    Ok(())
}

/// Validate only the fields a patch actually sets
pub fn validate_task_patch(patch: &TaskPatch, today: NaiveDate) -> Result<(), ValidationError> {
    if patch.is_empty() {
        return Err(ValidationError::EmptyPatch);
    }
    if let Some(ref title) = patch.title {
        check_title(title)?;
    }
    if let Some(due) = patch.due_date {
        check_due_date(due, today)?;
    }
    Ok(())
}

pub fn validate_new_category(new_category: &NewCategory) -> Result<(), ValidationError> {
    if new_category.name.trim().is_empty() {
        return Err(ValidationError::EmptyCategoryName);
    }
    check_color(&new_category.color)
}

pub fn validate_category_patch(patch: &CategoryPatch) -> Result<(), ValidationError> {
    if patch.name.is_none() && patch.color.is_none() {
        return Err(ValidationError::EmptyPatch);
    }
    if let Some(ref name) = patch.name {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyCategoryName);
        }
    }
    if let Some(ref color) = patch.color {
        check_color(color)?;
    }
    Ok(())
}
