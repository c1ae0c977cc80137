pub mod cli;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod models;
pub mod query;
pub mod render;
pub mod store;
pub mod utils;
pub mod validation;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardError};
pub use database::Database;
pub use models::{Category, NewCategory, NewTask, Priority, Task, TaskPatch};
pub use query::{SortKey, StatusFilter, ViewState};
pub use store::{Latency, Store, StoreError};
pub use utils::Profile;
