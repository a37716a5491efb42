use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::Todo;

pub const DEFAULT_LIMIT: usize = 50;

/// Timestamp column a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    /// Accepts `asc` / `desc` in any case
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            _ => Err(ValidationError::InvalidSortOrder(value.to_string())),
        }
    }
}

/// Resolved ordering, `-created_at` unless told otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    /// Resolve a sort key such as `-updated_at`.
    ///
    /// Unknown fields fall back to the default `-created_at` rather than
    /// failing, so this never errors.
    pub fn parse(value: &str) -> Sort {
        let key = value.trim().to_lowercase();
        let (direction, field) = match key.strip_prefix('-') {
            Some(field) => (SortDirection::Descending, field),
            None => (SortDirection::Ascending, key.as_str()),
        };

        match field {
            "created_at" => Sort {
                field: SortField::CreatedAt,
                direction,
            },
            "updated_at" => Sort {
                field: SortField::UpdatedAt,
                direction,
            },
            _ => Sort::default(),
        }
    }

    /// Keep the field, replace the direction
    pub fn with_direction(self, direction: SortDirection) -> Sort {
        Sort { direction, ..self }
    }

    /// Order two todos by the sort field alone; equal keys compare equal so
    /// a stable sort keeps insertion order for ties.
    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        let (left, right) = match self.field {
            SortField::CreatedAt => (a.created_at, b.created_at),
            SortField::UpdatedAt => (a.updated_at, b.updated_at),
        };

        match self.direction {
            SortDirection::Ascending => left.cmp(&right),
            SortDirection::Descending => right.cmp(&left),
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction == SortDirection::Descending {
            f.write_str("-")?;
        }
        f.write_str(self.field.column())
    }
}

/// Filter, sort and pagination parameters for listing todos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: usize,
    pub offset: usize,
    /// Exact match on the completion flag
    pub completed: Option<bool>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    pub sort: Sort,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            limit: DEFAULT_LIMIT,
            offset: 0,
            completed: None,
            search: None,
            sort: Sort::default(),
        }
    }
}

impl ListQuery {
    /// Lower-cased search needle, `None` when there is nothing to search for
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Steps 1 and 2 of the listing algorithm: completion then search filter
    pub fn matches(&self, todo: &Todo, needle: Option<&str>) -> bool {
        if let Some(completed) = self.completed {
            if todo.completed != completed {
                return false;
            }
        }

        match needle {
            Some(needle) => {
                contains_folded(&todo.title, needle)
                    || todo
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_folded(d, needle))
            }
            None => true,
        }
    }
}

/// Case-insensitive containment against an already lower-cased needle.
///
/// The SQLite backend registers this as a SQL function so both backends fold
/// case the same way.
pub fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
