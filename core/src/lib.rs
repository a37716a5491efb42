#![deny(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

pub mod db;
pub mod due_date;
pub mod envelope;
pub mod error;
pub mod factory;
pub mod memory;
pub mod models;
pub mod query;
pub mod repository;
pub mod schema;

// Re-export commonly used types
pub use db::SqliteTodoRepository;
pub use due_date::{normalize_timestamp, parse_due_date, DueDateInput};
pub use envelope::{paginate, Page};
pub use error::{RepoResult, StorageError, ValidationError};
pub use factory::{open_repository, BackendKind, StorageConfig, DEFAULT_SQLITE_PATH};
pub use memory::InMemoryTodoRepository;
pub use models::{NewTodo, Patch, Title, Todo, TodoId, TodoPatch, TITLE_MAX_CHARS};
pub use query::{ListQuery, Sort, SortDirection, SortField, DEFAULT_LIMIT};
pub use repository::TodoRepository;
