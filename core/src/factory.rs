use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::db::SqliteTodoRepository;
use crate::error::RepoResult;
use crate::memory::InMemoryTodoRepository;
use crate::repository::TodoRepository;

pub const DEFAULT_SQLITE_PATH: &str = "./data/todos.db";

/// Which backend to build at start-up
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageConfig {
    #[default]
    Memory,
    Sqlite {
        path: PathBuf,
    },
}

impl StorageConfig {
    pub fn backend(&self) -> &'static str {
        match self {
            StorageConfig::Memory => "memory",
            StorageConfig::Sqlite { .. } => "sqlite",
        }
    }
}

/// Backend names accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Sqlite,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(format!(
                "unsupported persistence backend `{other}`, expected `memory` or `sqlite`"
            )),
        }
    }
}

/// Build the configured repository.
///
/// A SQLite database that cannot be opened is returned as an error; there is
/// no fallback to the in-memory backend.
pub fn open_repository(config: &StorageConfig) -> RepoResult<Arc<dyn TodoRepository>> {
    let repository: Arc<dyn TodoRepository> = match config {
        StorageConfig::Memory => Arc::new(InMemoryTodoRepository::new()),
        StorageConfig::Sqlite { path } => Arc::new(SqliteTodoRepository::open(path)?),
    };

    info!(backend = repository.backend(), "Repository ready");
    Ok(repository)
}
