use crate::error::RepoResult;
use crate::models::{NewTodo, Todo, TodoId, TodoPatch};
use crate::query::ListQuery;

/// Storage contract shared by every todo backend.
///
/// Missing ids are reported through `Option` / `bool`, never as errors; the
/// error side is reserved for storage faults. Implementations return owned
/// copies so callers can never mutate stored state.
pub trait TodoRepository: Send + Sync {
    /// Short backend name, `memory` or `sqlite`
    fn backend(&self) -> &'static str;

    /// Store a new todo with a fresh id and `created_at == updated_at == now`
    fn create(&self, new: NewTodo) -> RepoResult<Todo>;

    fn get(&self, id: TodoId) -> RepoResult<Option<Todo>>;

    /// Apply the fields present in `patch`, refreshing `updated_at`
    fn update(&self, id: TodoId, patch: TodoPatch) -> RepoResult<Option<Todo>>;

    /// Returns whether a todo was removed
    fn delete(&self, id: TodoId) -> RepoResult<bool>;

    /// Filter, sort and slice; the count is taken before slicing
    fn list(&self, query: &ListQuery) -> RepoResult<(Vec<Todo>, usize)>;
}
