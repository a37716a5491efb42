use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Repository-assigned identifier, positive and never reused
pub type TodoId = i64;

pub const TITLE_MAX_CHARS: usize = 200;

/// A stored todo item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    /// Trimmed, 1..=200 characters
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    /// Set once by the repository
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update, never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub(crate) fn from_new(id: TodoId, new: NewTodo, now: DateTime<Utc>) -> Self {
        Todo {
            id,
            title: new.title.into_inner(),
            description: new.description,
            completed: new.completed,
            due_date: new.due_date.map(|due| due.trunc_subsecs(6)),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the fields present in `patch` and refresh `updated_at`
    pub(crate) fn apply(&mut self, patch: TodoPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title.into_inner();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        patch.description.apply_to(&mut self.description);
        patch
            .due_date
            .map(|due| due.trunc_subsecs(6))
            .apply_to(&mut self.due_date);

        self.updated_at = now.max(self.created_at);
    }
}

/// Current time at the precision both backends can store
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A validated todo title
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    /// Trim surrounding whitespace and enforce the 1..=200 character bound
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let len = trimmed.chars().count();

        if len == 0 {
            return Err(ValidationError::EmptyTitle);
        }
        if len > TITLE_MAX_CHARS {
            return Err(ValidationError::TitleTooLong {
                len,
                max: TITLE_MAX_CHARS,
            });
        }

        Ok(Title(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Title {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Title::parse(value)
    }
}

/// Fields for a todo that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: Title,
    pub description: Option<String>,
    pub completed: bool,
    /// Build through [`crate::parse_due_date`] or [`crate::normalize_timestamp`];
    /// years outside 0000-9999 cannot be stored
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTodo {
    pub fn new(title: Title) -> Self {
        NewTodo {
            title,
            description: None,
            completed: false,
            due_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Tri-state update of a nullable field.
///
/// Deserializing a missing field needs `#[serde(default)]` on the field to
/// produce `Unset`; an explicit `null` becomes `Null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Unset,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(f(value)),
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(f(value)?),
        })
    }

    /// Overwrite `target` unless this patch is `Unset`
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Unset => {}
            Patch::Null => *target = None,
            Patch::Value(value) => *target = Some(value),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

/// Partial update of a todo. Every field defaults to "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<Title>,
    pub description: Patch<String>,
    pub completed: Option<bool>,
    pub due_date: Patch<DateTime<Utc>>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_unset()
            && self.completed.is_none()
            && self.due_date.is_unset()
    }
}

/// Full replacement: every field is written, absent optionals are cleared
impl From<NewTodo> for TodoPatch {
    fn from(new: NewTodo) -> Self {
        TodoPatch {
            title: Some(new.title),
            description: new.description.into(),
            completed: Some(new.completed),
            due_date: new.due_date.into(),
        }
    }
}
