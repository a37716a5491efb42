#![allow(clippy::unwrap_used)]

use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use todo_core::{
    normalize_timestamp, parse_due_date, InMemoryTodoRepository, ListQuery, NewTodo, Patch, Sort, SqliteTodoRepository,
    Title, Todo, TodoPatch, TodoRepository,
};

/// Keeps the temp dir alive for as long as the SQLite repository is used
struct Backends {
    _dir: TempDir,
    memory: InMemoryTodoRepository,
    sqlite: SqliteTodoRepository,
}

impl Backends {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let sqlite = SqliteTodoRepository::open(dir.path().join("todos.db")).unwrap();

        Self {
            _dir: dir,
            memory: InMemoryTodoRepository::new(),
            sqlite,
        }
    }

    fn each(&self) -> [&dyn TodoRepository; 2] {
        [&self.memory, &self.sqlite]
    }
}

fn new_todo(title: &str) -> NewTodo {
    NewTodo::new(Title::parse(title).unwrap())
}

/// Mirrors the seed used by the HTTP tests: "Task i" / "Desc i", even ones done
fn seed(repo: &dyn TodoRepository, count: usize) -> Vec<Todo> {
    (0..count)
        .map(|i| {
            let todo = new_todo(&format!("Task {i}"))
                .with_description(format!("Desc {i}"))
                .with_completed(i % 2 == 0);
            // distinct timestamps keep the ordering identical across backends
            thread::sleep(Duration::from_millis(2));
            repo.create(todo).unwrap()
        })
        .collect()
}

fn query(f: impl FnOnce(&mut ListQuery)) -> ListQuery {
    let mut query = ListQuery::default();
    f(&mut query);
    query
}

#[test]
fn test_create_stamps_equal_timestamps_not_in_future() {
    let backends = Backends::new();

    for repo in backends.each() {
        let todo = repo.create(new_todo("Buy milk")).unwrap();

        assert_eq!(todo.created_at, todo.updated_at, "{}", repo.backend());
        assert!(todo.created_at <= Utc::now());
        assert!(todo.id > 0);
    }
}

#[test]
fn test_round_trip_preserves_supplied_fields() {
    let backends = Backends::new();
    let due = parse_due_date("2099-12-25").unwrap();

    for repo in backends.each() {
        let created = repo
            .create(
                new_todo("  Pay bills  ")
                    .with_description("Electricity")
                    .with_completed(true)
                    .with_due_date(due),
            )
            .unwrap();

        let fetched = repo.get(created.id).unwrap().unwrap();

        assert_eq!(fetched, created, "{}", repo.backend());
        assert_eq!(fetched.title, "Pay bills");
        assert_eq!(fetched.description.as_deref(), Some("Electricity"));
        assert!(fetched.completed);
        assert_eq!(
            fetched.due_date,
            Some(Utc.with_ymd_and_hms(2099, 12, 25, 0, 0, 0).unwrap())
        );
    }
}

#[test]
fn test_get_unknown_id_is_not_found() {
    let backends = Backends::new();

    for repo in backends.each() {
        repo.create(new_todo("only one")).unwrap();

        assert_eq!(repo.get(999_999).unwrap(), None, "{}", repo.backend());
        assert_eq!(repo.get(0).unwrap(), None);
    }
}

#[test]
fn test_update_refreshes_updated_at_only() {
    let backends = Backends::new();

    for repo in backends.each() {
        let created = repo.create(new_todo("Partial").with_description("X")).unwrap();
        thread::sleep(Duration::from_millis(5));

        let patch = TodoPatch {
            title: Some(Title::parse("Partial Updated").unwrap()),
            completed: Some(true),
            ..Default::default()
        };
        let updated = repo.update(created.id, patch).unwrap().unwrap();

        assert_eq!(updated.created_at, created.created_at, "{}", repo.backend());
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.title, "Partial Updated");
        assert!(updated.completed);
        assert_eq!(updated.description.as_deref(), Some("X"));
        assert_eq!(repo.get(created.id).unwrap(), Some(updated));
    }
}

#[test]
fn test_omitted_description_is_kept_and_null_clears_it() {
    let backends = Backends::new();

    for repo in backends.each() {
        let todo = repo.create(new_todo("A todo").with_description("A")).unwrap();

        let renamed = repo
            .update(
                todo.id,
                TodoPatch {
                    title: Some(Title::parse("B").unwrap()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(renamed.description.as_deref(), Some("A"), "{}", repo.backend());

        let cleared = repo
            .update(
                todo.id,
                TodoPatch {
                    description: Patch::Null,
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.title, "B");
    }
}

#[test]
fn test_full_replacement_clears_absent_optionals() {
    let backends = Backends::new();
    let due = parse_due_date("2100-01-01").unwrap();

    for repo in backends.each() {
        let todo = repo.create(new_todo("Initial").with_description("A")).unwrap();

        let replacement = new_todo("Replaced").with_completed(true).with_due_date(due);
        let replaced = repo.update(todo.id, replacement.into()).unwrap().unwrap();

        assert_eq!(replaced.title, "Replaced", "{}", repo.backend());
        assert_eq!(replaced.description, None);
        assert!(replaced.completed);
        assert_eq!(replaced.due_date, Some(due));
    }
}

#[test]
fn test_update_unknown_id_is_not_found() {
    let backends = Backends::new();

    for repo in backends.each() {
        let patch = TodoPatch {
            title: Some(Title::parse("Nope").unwrap()),
            ..Default::default()
        };

        assert_eq!(repo.update(123_456, patch).unwrap(), None, "{}", repo.backend());
    }
}

#[test]
fn test_delete_twice() {
    let backends = Backends::new();

    for repo in backends.each() {
        let todo = repo.create(new_todo("ToDelete")).unwrap();

        assert!(repo.delete(todo.id).unwrap(), "{}", repo.backend());
        assert!(!repo.delete(todo.id).unwrap());
        assert_eq!(repo.get(todo.id).unwrap(), None);
    }
}

#[test]
fn test_filter_completed() {
    let backends = Backends::new();

    for repo in backends.each() {
        seed(repo, 6);

        let (done, total) = repo.list(&query(|q| q.completed = Some(true))).unwrap();
        assert_eq!(total, 3, "{}", repo.backend());
        assert_eq!(done.len(), 3);
        assert!(done.iter().all(|t| t.completed));

        let (open, total) = repo.list(&query(|q| q.completed = Some(false))).unwrap();
        assert_eq!(total, 3);
        assert!(open.iter().all(|t| !t.completed));
    }
}

#[test]
fn test_pagination() {
    let backends = Backends::new();

    for repo in backends.each() {
        seed(repo, 7);

        let (first, total) = repo.list(&query(|q| q.limit = 3)).unwrap();
        assert_eq!((first.len(), total), (3, 7), "{}", repo.backend());

        let (last, total) = repo
            .list(&query(|q| {
                q.limit = 3;
                q.offset = 6;
            }))
            .unwrap();
        assert_eq!((last.len(), total), (1, 7));

        let (beyond, total) = repo.list(&query(|q| q.offset = 50)).unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 7);

        let (none, total) = repo.list(&query(|q| q.limit = 0)).unwrap();
        assert!(none.is_empty());
        assert_eq!(total, 7);
    }
}

#[test]
fn test_sorting() {
    let backends = Backends::new();

    for repo in backends.each() {
        let seeded = seed(repo, 5);

        let (newest_first, _) = repo.list(&ListQuery::default()).unwrap();
        assert!(
            newest_first.windows(2).all(|w| w[0].created_at >= w[1].created_at),
            "{}",
            repo.backend()
        );
        assert_eq!(newest_first[0].id, seeded[4].id);

        let (oldest_first, _) = repo
            .list(&query(|q| q.sort = Sort::parse("created_at")))
            .unwrap();
        assert!(oldest_first.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert_eq!(oldest_first[0].id, seeded[0].id);

        // touching the oldest todo moves it to the front of -updated_at
        thread::sleep(Duration::from_millis(2));
        repo.update(seeded[0].id, TodoPatch::default()).unwrap();
        let (recent, _) = repo
            .list(&query(|q| q.sort = Sort::parse("-updated_at")))
            .unwrap();
        assert_eq!(recent[0].id, seeded[0].id);
    }
}

#[test]
fn test_search_title_or_description() {
    let backends = Backends::new();

    for repo in backends.each() {
        seed(repo, 5);

        let (by_title, total) = repo
            .list(&query(|q| q.search = Some("task 1".to_string())))
            .unwrap();
        assert_eq!(total, 1, "{}", repo.backend());
        assert_eq!(by_title[0].title, "Task 1");

        let (by_description, _) = repo
            .list(&query(|q| q.search = Some("DESC 2".to_string())))
            .unwrap();
        assert_eq!(by_description[0].description.as_deref(), Some("Desc 2"));

        let (nothing, total) = repo
            .list(&query(|q| q.search = Some("groceries".to_string())))
            .unwrap();
        assert!(nothing.is_empty());
        assert_eq!(total, 0);
    }
}

#[test]
fn test_null_description_never_matches_search() {
    let backends = Backends::new();

    for repo in backends.each() {
        repo.create(new_todo("alpha")).unwrap();

        let (_, total) = repo
            .list(&query(|q| q.search = Some("beta".to_string())))
            .unwrap();

        assert_eq!(total, 0, "{}", repo.backend());
    }
}

#[test]
fn test_due_dates_past_year_9999_never_reach_storage() {
    let backends = Backends::new();
    let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();

    assert!(parse_due_date("+10000-01-01").is_err());
    assert!(normalize_timestamp(far).is_err());

    for repo in backends.each() {
        let last = parse_due_date("9999-12-31T23:59:59.999999").unwrap();
        let todo = repo.create(new_todo("Far future").with_due_date(last)).unwrap();

        assert_eq!(repo.get(todo.id).unwrap(), Some(todo.clone()), "{}", repo.backend());
        let (items, total) = repo.list(&ListQuery::default()).unwrap();
        assert_eq!((items, total), (vec![todo], 1));
    }
}

#[test]
fn test_sub_microsecond_due_dates_read_back_identically() {
    let backends = Backends::new();
    let precise = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
        + chrono::Duration::nanoseconds(123_456_789);

    for repo in backends.each() {
        let created = repo.create(new_todo("Precise").with_due_date(precise)).unwrap();
        assert_eq!(repo.get(created.id).unwrap(), Some(created.clone()), "{}", repo.backend());
        assert_eq!(
            created.due_date,
            Some(precise - chrono::Duration::nanoseconds(789))
        );

        let patch = TodoPatch {
            due_date: Patch::Value(precise),
            ..Default::default()
        };
        let updated = repo.update(created.id, patch).unwrap().unwrap();
        assert_eq!(repo.get(created.id).unwrap(), Some(updated));
    }
}

#[test]
fn test_whitespace_search_matches_everything() {
    let backends = Backends::new();

    for repo in backends.each() {
        repo.create(new_todo("a  b")).unwrap();
        repo.create(new_todo("ab")).unwrap();

        let (_, total) = repo
            .list(&query(|q| q.search = Some("  ".to_string())))
            .unwrap();

        assert_eq!(total, 2, "{}", repo.backend());
    }
}

#[test]
fn test_backends_produce_identical_listings() {
    let backends = Backends::new();

    for repo in backends.each() {
        seed(repo, 9);
        thread::sleep(Duration::from_millis(2));
        repo.delete(4).unwrap();
        repo.update(
            2,
            TodoPatch {
                description: Patch::Null,
                completed: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    }

    let queries = [
        ListQuery::default(),
        query(|q| q.sort = Sort::parse("updated_at")),
        query(|q| q.sort = Sort::parse("-updated_at")),
        query(|q| {
            q.completed = Some(true);
            q.limit = 2;
            q.offset = 1;
        }),
        query(|q| q.search = Some("desc".to_string())),
        query(|q| q.sort = Sort::parse("bogus")),
    ];

    // timestamps differ between runs, so compare everything else
    let shape = |items: Vec<Todo>| -> Vec<(i64, String, Option<String>, bool)> {
        items
            .into_iter()
            .map(|t| (t.id, t.title, t.description, t.completed))
            .collect()
    };

    for q in &queries {
        let (memory_items, memory_total) = backends.memory.list(q).unwrap();
        let (sqlite_items, sqlite_total) = backends.sqlite.list(q).unwrap();

        assert_eq!(memory_total, sqlite_total, "{q:?}");
        assert_eq!(shape(memory_items), shape(sqlite_items), "{q:?}");
    }
}
