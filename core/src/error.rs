use thiserror::Error;

pub type RepoResult<T> = Result<T, StorageError>;

/// Input that was rejected before any mutation was attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title length must be between 1 and {max} characters, got {len}")]
    TitleTooLong { len: usize, max: usize },
    #[error(
        "invalid due_date `{0}`: use an ISO-8601 date or datetime (e.g. '2025-01-31' or '2025-01-31T13:45:00')"
    )]
    InvalidDueDate(String),
    #[error("order must be 'asc' or 'desc'")]
    InvalidSortOrder(String),
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },
}

impl ValidationError {
    /// Name of the input field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::InvalidDueDate(_) => "due_date",
            Self::InvalidSortOrder(_) => "order",
            Self::OutOfRange { field, .. } | Self::Negative { field, .. } => *field,
        }
    }
}

/// Failure of the storage layer itself. Never used to signal a missing todo.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid persisted data in `{column}`: {message}")]
    InvalidData {
        column: &'static str,
        message: String,
    },
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: i32,
        latest_supported: i32,
    },
    #[error("in-memory store lock was poisoned")]
    Poisoned,
}
