use rusqlite::Connection;

use crate::error::StorageError;

/// Schema for the todos database
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
    due_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_todos_completed ON todos(completed);
CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at);
CREATE INDEX IF NOT EXISTS idx_todos_updated_at ON todos(updated_at);

PRAGMA user_version = 1;
"#;

pub const LATEST_VERSION: i32 = 1;

/// Get current schema version from database
pub fn get_schema_version(conn: &Connection) -> Result<i32, rusqlite::Error> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Run migrations to bring database to current schema version
pub fn migrate(conn: &mut Connection) -> Result<(), StorageError> {
    let version = get_schema_version(conn)?;

    if version > LATEST_VERSION {
        return Err(StorageError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: LATEST_VERSION,
        });
    }

    let tx = conn.transaction()?;
    if version == 0 {
        // Fresh database
        tx.execute_batch(SCHEMA_V1)?;
    }
    tx.commit()?;

    Ok(())
}
