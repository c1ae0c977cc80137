use chrono::NaiveDate;
use crossterm::style::{Color, Stylize};
use std::fmt::Write;

use crate::models::{Category, Priority, Task};
use crate::query::{self, DerivedView, ViewState};
use crate::validation::parse_hex_color;

const MAX_TITLE_WIDTH: usize = 48;

/// Parse a category color into a terminal color, white when unrecognised
pub fn category_color(color: &str) -> Color {
    match parse_hex_color(color) {
        Some((r, g, b)) => Color::Rgb { r, g, b },
        None => Color::White,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Urgent => Color::Red,
        Priority::High => Color::Yellow,
        Priority::Medium => Color::Blue,
        Priority::Low => Color::Grey,
    }
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() > max_width {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// A colored dot for a category, or a plain one without styling
fn swatch(color: &str, styled: bool) -> String {
    if styled {
        "●".with(category_color(color)).to_string()
    } else {
        "●".to_string()
    }
}

/// One line of the task list: status, id, title, priority, due label and category
pub fn render_task_line(
    task: &Task,
    categories: &[Category],
    today: NaiveDate,
    styled: bool,
) -> String {
    let status_indicator = if task.completed { "✓" } else { "○" };
    let title = format!("{:<width$}", truncate(&task.title, MAX_TITLE_WIDTH), width = MAX_TITLE_WIDTH);

    let priority = format!("{:<6}", task.priority.as_str());
    let priority = if styled {
        priority.with(priority_color(task.priority)).to_string()
    } else {
        priority
    };

    let due = task
        .due_date
        .map(|due| {
            let label = query::due_label(due, today);
            let text = format!("{:<10}", label.to_string());
            if styled && label.is_urgent() && !task.completed {
                text.red().bold().to_string()
            } else {
                text
            }
        })
        .unwrap_or_else(|| format!("{:<10}", "-"));

    let category = query::category_of(task, categories)
        .map(|category| format!("{} {}", swatch(&category.color, styled), category.name))
        .unwrap_or_default();

    let line = format!(
        "{} #{:<4} {} {} {} {}",
        status_indicator, task.id, title, priority, due, category
    );
    let line = line.trim_end().to_string();

    if styled && task.completed {
        line.dim().to_string()
    } else {
        line
    }
}

/// Sidebar: "All Tasks" plus every category, each with its badge when non-zero
pub fn render_sidebar(derived: &DerivedView<'_>, styled: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Categories");

    let all_badge = if derived.total_tasks > 0 {
        format!(" ({})", derived.total_tasks)
    } else {
        String::new()
    };
    let marker = if derived.current_category.is_none() { ">" } else { " " };
    let _ = writeln!(out, "{} ≡ All Tasks{}", marker, all_badge);

    for category in &derived.categories {
        let marker = if derived.current_category.map(|c| c.id) == Some(category.id) {
            ">"
        } else {
            " "
        };
        let badge = if category.task_count > 0 {
            format!(" ({})", category.task_count)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{} {} {} [{}]{}",
            marker,
            swatch(&category.color, styled),
            category.name,
            category.id,
            badge
        );
    }
    out
}

/// Full page: heading, status tabs, sidebar and the task list
pub fn render_page(
    derived: &DerivedView<'_>,
    view: &ViewState,
    today: NaiveDate,
    styled: bool,
) -> String {
    let mut out = String::new();

    let heading = derived.title().to_string();
    let heading = if styled { heading.bold().to_string() } else { heading };
    let _ = writeln!(out, "{}", heading);
    let _ = writeln!(
        out,
        "{} active, {} completed",
        derived.counts.active, derived.counts.completed
    );
    let _ = writeln!(out);

    let tabs = [
        ("All Tasks", derived.counts.all, query::StatusFilter::All),
        ("Active", derived.counts.active, query::StatusFilter::Active),
        ("Completed", derived.counts.completed, query::StatusFilter::Completed),
    ];
    let tab_line: Vec<String> = tabs
        .iter()
        .map(|(label, count, status)| {
            let text = if *count > 0 {
                format!("{} {}", label, count)
            } else {
                label.to_string()
            };
            if *status == view.status {
                format!("[{}]", text)
            } else {
                format!(" {} ", text)
            }
        })
        .collect();
    let _ = writeln!(out, "{}   sort: {}", tab_line.join(" "), view.sort_key.as_str());
    if !view.search_text.is_empty() {
        let _ = writeln!(out, "search: \"{}\"", view.search_text);
    }
    let _ = writeln!(out);

    out.push_str(&render_sidebar(derived, styled));
    let _ = writeln!(out);

    if derived.tasks.is_empty() {
        let _ = writeln!(out, "No tasks found");
    } else {
        for task in &derived.tasks {
            let _ = writeln!(
                out,
                "{}",
                render_task_line(task, &derived.categories, today, styled)
            );
        }
    }
    out
}
