use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::{debug, info};

use crate::error::{RepoResult, StorageError};
use crate::models::{now, NewTodo, Todo, TodoId, TodoPatch};
use crate::query::{contains_folded, ListQuery};
use crate::repository::TodoRepository;
use crate::schema;

const TODO_SELECT_SQL: &str =
    "SELECT id, title, description, completed, due_date, created_at, updated_at FROM todos";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQL name of [`contains_folded`] on every connection
const CONTAINS_FN: &str = "todo_contains";

/// Todo repository backed by a SQLite file.
///
/// Every operation opens its own connection and transaction; both are
/// released when the call returns, whatever the outcome.
#[derive(Debug, Clone)]
pub struct SqliteTodoRepository {
    path: PathBuf,
}

impl SqliteTodoRepository {
    /// Open or create a todos database at the specified path
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref().to_path_buf();
        info!("Setting up todos database at {:?}", path);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let repository = SqliteTodoRepository { path };
        let mut conn = repository.connect()?;
        schema::migrate(&mut conn)?;

        info!("Todos database ready");
        Ok(repository)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> RepoResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.create_scalar_function(
            CONTAINS_FN,
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let haystack: Option<String> = ctx.get(0)?;
                let needle: String = ctx.get(1)?;
                Ok(haystack.is_some_and(|h| contains_folded(&h, &needle)))
            },
        )?;
        Ok(conn)
    }
}

impl TodoRepository for SqliteTodoRepository {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn create(&self, new: NewTodo) -> RepoResult<Todo> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now();

        tx.execute(
            "INSERT INTO todos (title, description, completed, due_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.title.as_str(),
                new.description,
                new.completed,
                new.due_date.map(to_sql_timestamp),
                to_sql_timestamp(now),
                to_sql_timestamp(now),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(id, "created todo");
        Ok(Todo::from_new(id, new, now))
    }

    fn get(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let conn = self.connect()?;
        select_todo(&conn, id)
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> RepoResult<Option<Todo>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // dropping the transaction rolls it back
        let Some(mut todo) = select_todo(&tx, id)? else {
            return Ok(None);
        };
        todo.apply(patch, now());

        tx.execute(
            "UPDATE todos SET title = ?1, description = ?2, completed = ?3, due_date = ?4, updated_at = ?5 WHERE id = ?6",
            params![
                todo.title,
                todo.description,
                todo.completed,
                todo.due_date.map(to_sql_timestamp),
                to_sql_timestamp(todo.updated_at),
                id,
            ],
        )?;
        tx.commit()?;

        debug!(id, "updated todo");
        Ok(Some(todo))
    }

    fn delete(&self, id: TodoId) -> RepoResult<bool> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let rows = tx.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        tx.commit()?;

        if rows > 0 {
            debug!(id, "deleted todo");
        }
        Ok(rows > 0)
    }

    fn list(&self, query: &ListQuery) -> RepoResult<(Vec<Todo>, usize)> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(completed) = query.completed {
            where_sql.push_str(" AND completed = ?");
            params.push(Box::new(completed));
        }

        if let Some(needle) = query.needle() {
            where_sql.push_str(&format!(
                " AND ({CONTAINS_FN}(title, ?) OR {CONTAINS_FN}(description, ?))"
            ));
            params.push(Box::new(needle.clone()));
            params.push(Box::new(needle));
        }

        // Timestamps are fixed-width UTC text, so text order is time order;
        // ties fall back to insertion order in both directions
        let order_sql = format!(
            " ORDER BY {} {}, id ASC",
            query.sort.field.column(),
            query.sort.direction.sql()
        );

        let mut conn = self.connect()?;
        // one read transaction so the count and the page see the same rows
        let tx = conn.transaction()?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|b| b.as_ref()).collect();
        let total: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM todos{where_sql}"),
            params_refs.as_slice(),
            |row| row.get(0),
        )?;

        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);
        let mut page_params = params_refs;
        page_params.push(&limit);
        page_params.push(&offset);

        let mut todos = Vec::new();
        {
            let mut stmt =
                tx.prepare(&format!("{TODO_SELECT_SQL}{where_sql}{order_sql} LIMIT ? OFFSET ?"))?;
            let mut rows = stmt.query(page_params.as_slice())?;
            while let Some(row) = rows.next()? {
                todos.push(parse_todo_row(row)?);
            }
        }
        tx.commit()?;

        let total = usize::try_from(total).map_err(|_| StorageError::InvalidData {
            column: "COUNT(*)",
            message: format!("negative count {total}"),
        })?;
        Ok((todos, total))
    }
}

fn select_todo(conn: &Connection, id: TodoId) -> RepoResult<Option<Todo>> {
    let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1"))?;
    let row = stmt
        .query_row(params![id], |row| Ok(parse_todo_row(row)))
        .optional()?;

    row.transpose()
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(StorageError::InvalidData {
                column: "completed",
                message: format!("expected 0 or 1, got {other}"),
            });
        }
    };

    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(text) => Some(from_sql_timestamp("due_date", &text)?),
        None => None,
    };

    Ok(Todo {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        completed,
        due_date,
        created_at: from_sql_timestamp("created_at", &row.get::<_, String>("created_at")?)?,
        updated_at: from_sql_timestamp("updated_at", &row.get::<_, String>("updated_at")?)?,
    })
}

/// ISO-8601, UTC, always six fractional digits
fn to_sql_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn from_sql_timestamp(column: &'static str, text: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidData {
            column,
            message: format!("`{text}` is not an ISO-8601 timestamp: {e}"),
        })
}
