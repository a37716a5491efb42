#![allow(clippy::unwrap_used)]

use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use todo_core::open_repository;

use crate::{router::setup_router, settings::Settings, state::AppState};


/// Server over a fresh in-memory repository with default settings
pub fn setup_server() -> TestServer {
    setup_server_with(Settings::default())
}

pub fn setup_server_with(settings: Settings) -> TestServer {
    let repository = open_repository(&settings.storage).unwrap();
    let app = setup_router(AppState::new(repository, settings));

    TestServer::new(app).unwrap()
}

/// `Authorization` value for base64-encoded `username:password`
pub fn basic(encoded: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Basic {encoded}")).unwrap()
}

/// Create `count` todos titled "Task i" / "Desc i", even ones completed
pub async fn seed(server: &TestServer, count: usize) -> Vec<Value> {
    let mut created = Vec::with_capacity(count);
    for i in 0..count {
        // distinct timestamps keep the default ordering deterministic
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let response = server
            .post("/api/v1/todos")
            .json(&json!({
                "title": format!("Task {i}"),
                "description": format!("Desc {i}"),
                "completed": i % 2 == 0,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        created.push(response.json::<Value>());
    }
    created
}
