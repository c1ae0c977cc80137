#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use taskdeck::models::{Category, Priority, SeedData, Task};
use taskdeck::{Latency, Store};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// An open, medium-priority, uncategorised task created `id` hours after the base time
pub fn task(id: i64, title: &str) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: String::new(),
        due_date: None,
        priority: Priority::Medium,
        category_id: None,
        completed: false,
        created_at: base_time() + Duration::hours(id),
        completed_at: None,
    }
}

pub fn completed(mut task: Task) -> Task {
    task.completed = true;
    task.completed_at = Some(task.created_at + Duration::hours(1));
    task
}

pub fn category(id: i64, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        color: "#5B47E0".to_string(),
        task_count: 0,
    }
}

/// A varied collection used by the property-style tests
pub fn mixed_tasks() -> Vec<Task> {
    let mut tasks = vec![
        task(1, "Team meeting"),
        task(2, "write quarterly report"),
        task(3, "Buy groceries"),
        task(4, "Call mom"),
        task(5, "Renew passport"),
        task(6, "book flights"),
        task(7, "Fix bike"),
        task(8, "Pay rent"),
    ];
    tasks[0].category_id = Some(1);
    tasks[0].due_date = Some(date(2026, 3, 10));
    tasks[0].priority = Priority::High;
    tasks[1].category_id = Some(1);
    tasks[1].description = "numbers for the MEETING".to_string();
    tasks[1].priority = Priority::Urgent;
    tasks[2].category_id = Some(2);
    tasks[2].due_date = Some(date(2026, 3, 5));
    tasks[2].priority = Priority::Low;
    tasks[3].category_id = Some(2);
    tasks[4].category_id = Some(9); // dangling
    tasks[4].due_date = Some(date(2026, 4, 1));
    tasks[5].due_date = Some(date(2026, 3, 5));
    tasks[5].priority = Priority::Urgent;
    tasks[6].category_id = Some(1);
    tasks[7].due_date = Some(date(2026, 2, 28));
    tasks[7].priority = Priority::High;

    tasks[1] = completed(tasks[1].clone());
    tasks[3] = completed(tasks[3].clone());
    tasks[6] = completed(tasks[6].clone());
    tasks
}

pub fn seed() -> SeedData {
    SeedData {
        categories: vec![category(1, "Work"), category(2, "Home")],
        tasks: mixed_tasks(),
    }
}

/// Zero-latency store with the mixed fixture loaded
pub fn seeded_store() -> Store {
    Store::seeded(&seed(), Latency::none()).expect("Failed to seed store")
}

pub fn empty_store() -> Store {
    Store::new(Latency::none()).expect("Failed to create store")
}
