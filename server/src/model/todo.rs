use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use todo_core::{
    parse_due_date, ListQuery, NewTodo, Page, Patch, Sort, SortDirection, Title, Todo, TodoPatch,
    ValidationError, DEFAULT_LIMIT,
};

use crate::errors::{RestError, RestResult};

pub const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TodoDto {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoDto {
    fn from(todo: Todo) -> Self {
        TodoDto {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            due_date: todo.due_date,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// Body of `POST /api/v1/todos` and `PUT /api/v1/todos/:id`
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CreateTodoRequest {
    /// 1 to 200 characters after trimming
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    /// ISO-8601 date or datetime
    #[serde(default)]
    pub due_date: Option<String>,
}

impl CreateTodoRequest {
    /// Validate every field, reporting all problems at once
    pub fn into_new_todo(self) -> RestResult<NewTodo> {
        let title = Title::parse(&self.title);
        let due_date = self.due_date.as_deref().map(parse_due_date).transpose();

        match (title, due_date) {
            (Ok(title), Ok(due_date)) => Ok(NewTodo {
                title,
                description: self.description,
                completed: self.completed.unwrap_or(false),
                due_date,
            }),
            (title, due_date) => Err(RestError::Validation(
                [title.err(), due_date.err()].into_iter().flatten().collect(),
            )),
        }
    }
}

/// Body of `PATCH /api/v1/todos/:id`.
///
/// Omitted fields are left alone; `null` clears `description` and `due_date`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub description: Patch<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub due_date: Patch<String>,
}

impl UpdateTodoRequest {
    pub fn into_patch(self) -> RestResult<TodoPatch> {
        let title = self.title.as_deref().map(Title::parse).transpose();
        let due_date = self.due_date.try_map(|value| parse_due_date(&value));

        match (title, due_date) {
            (Ok(title), Ok(due_date)) => Ok(TodoPatch {
                title,
                description: self.description,
                completed: self.completed,
                due_date,
            }),
            (title, due_date) => Err(RestError::Validation(
                [title.err(), due_date.err()].into_iter().flatten().collect(),
            )),
        }
    }
}

/// Query string of `GET /api/v1/todos`
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListTodosParams {
    /// 0 to 1000, default 50
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub completed: Option<bool>,
    /// Case-insensitive search in title and description
    pub q: Option<String>,
    /// `created_at`, `-created_at`, `updated_at` or `-updated_at`
    pub sort: Option<String>,
    /// `asc` or `desc`, overrides the direction given by `sort`
    pub order: Option<String>,
}

impl ListTodosParams {
    pub fn into_query(self) -> RestResult<ListQuery> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT as i64);
        let offset = self.offset.unwrap_or(0);

        let mut errors = Vec::new();
        if !(0..=MAX_LIMIT).contains(&limit) {
            errors.push(ValidationError::OutOfRange {
                field: "limit",
                value: limit,
                min: 0,
                max: MAX_LIMIT,
            });
        }
        if offset < 0 {
            errors.push(ValidationError::Negative {
                field: "offset",
                value: offset,
            });
        }
        if !errors.is_empty() {
            return Err(RestError::Validation(errors));
        }

        let mut sort = self.sort.as_deref().map(Sort::parse).unwrap_or_default();
        if let Some(order) = self.order.as_deref() {
            sort = sort.with_direction(order.parse::<SortDirection>()?);
        }

        let search = self
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        Ok(ListQuery {
            limit: limit.unsigned_abs() as usize,
            offset: offset.unsigned_abs() as usize,
            completed: self.completed,
            search,
            sort,
        })
    }
}

/// Pagination envelope
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TodoPage {
    pub items: Vec<TodoDto>,
    /// Matches before pagination
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl From<Page<TodoDto>> for TodoPage {
    fn from(page: Page<TodoDto>) -> Self {
        TodoPage {
            items: page.items,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TodoPath {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HealthResponse {
    pub message: String,
    pub backend: String,
}
