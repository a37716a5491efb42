use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::error::{RepoResult, StorageError};
use crate::models::{now, NewTodo, Todo, TodoId, TodoPatch};
use crate::query::ListQuery;
use crate::repository::TodoRepository;

#[derive(Debug)]
struct Store {
    // keyed by id, so iteration order is insertion order
    todos: BTreeMap<TodoId, Todo>,
    next_id: TodoId,
}

/// Process-local repository behind a single coarse lock
#[derive(Debug)]
pub struct InMemoryTodoRepository {
    store: Mutex<Store>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        InMemoryTodoRepository {
            store: Mutex::new(Store {
                todos: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Store>> {
        self.store.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn create(&self, new: NewTodo) -> RepoResult<Todo> {
        let mut store = self.lock()?;

        let id = store.next_id;
        store.next_id += 1;

        let todo = Todo::from_new(id, new, now());
        store.todos.insert(id, todo.clone());
        debug!(id, "created todo");

        Ok(todo)
    }

    fn get(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let store = self.lock()?;
        Ok(store.todos.get(&id).cloned())
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> RepoResult<Option<Todo>> {
        let mut store = self.lock()?;

        let Some(todo) = store.todos.get_mut(&id) else {
            return Ok(None);
        };
        todo.apply(patch, now());
        debug!(id, "updated todo");

        Ok(Some(todo.clone()))
    }

    fn delete(&self, id: TodoId) -> RepoResult<bool> {
        let mut store = self.lock()?;
        let removed = store.todos.remove(&id).is_some();
        if removed {
            debug!(id, "deleted todo");
        }
        Ok(removed)
    }

    fn list(&self, query: &ListQuery) -> RepoResult<(Vec<Todo>, usize)> {
        let store = self.lock()?;
        let needle = query.needle();

        let mut matching: Vec<&Todo> = store
            .todos
            .values()
            .filter(|todo| query.matches(todo, needle.as_deref()))
            .collect();
        let total = matching.len();

        // stable, so equal timestamps stay in id order
        matching.sort_by(|a, b| query.sort.compare(a, b));

        let page = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();

        Ok((page, total))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::models::{Patch, Title};
    use crate::query::Sort;
    use std::sync::Arc;
    use std::thread;

    fn new_todo(title: &str) -> NewTodo {
        NewTodo::new(Title::parse(title).unwrap())
    }

    #[test]
    fn test_ids_are_never_reused() {
        let repo = InMemoryTodoRepository::new();

        let first = repo.create(new_todo("a")).unwrap();
        let second = repo.create(new_todo("b")).unwrap();
        assert!(repo.delete(second.id).unwrap());

        let third = repo.create(new_todo("c")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
    }

    #[test]
    fn test_returned_copies_do_not_alias_store() {
        let repo = InMemoryTodoRepository::new();
        let mut todo = repo.create(new_todo("original")).unwrap();

        todo.title = "mutated".to_string();

        assert_eq!(repo.get(todo.id).unwrap().unwrap().title, "original");
    }

    #[test]
    fn test_update_missing_id_is_none() {
        let repo = InMemoryTodoRepository::new();
        let patch = TodoPatch {
            description: Patch::Value("x".to_string()),
            ..Default::default()
        };

        assert_eq!(repo.update(42, patch).unwrap(), None);
    }

    #[test]
    fn test_ties_keep_insertion_order_both_directions() {
        let repo = InMemoryTodoRepository::new();
        let now = now();
        {
            let mut store = repo.lock().unwrap();
            for id in 1..=3 {
                let todo = Todo::from_new(id, new_todo(&format!("t{id}")), now);
                store.todos.insert(id, todo);
            }
            store.next_id = 4;
        }

        for sort in ["created_at", "-created_at"] {
            let query = ListQuery {
                sort: Sort::parse(sort),
                ..Default::default()
            };
            let (items, _) = repo.list(&query).unwrap();
            let ids: Vec<TodoId> = items.iter().map(|t| t.id).collect();

            assert_eq!(ids, vec![1, 2, 3], "sort {sort}");
        }
    }

    #[test]
    fn test_concurrent_creates_get_distinct_ids() {
        let repo = Arc::new(InMemoryTodoRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    (0..25)
                        .map(|i| repo.create(new_todo(&format!("{n}-{i}"))).unwrap().id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<TodoId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 200);
        let (_, total) = repo.list(&ListQuery::default()).unwrap();
        assert_eq!(total, 200);
    }
}
