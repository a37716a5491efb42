use aide::{
    axum::{routing::get_with, ApiRouter, IntoApiResponse},
    transform::TransformOperation,
};
use axum::{extract::State, Json};

use crate::{model::todo::HealthResponse, state::AppState};

pub fn health_routes() -> ApiRouter<AppState> {
    ApiRouter::new().api_route("/", get_with(health, health_docs))
}

pub async fn health(State(state): State<AppState>) -> impl IntoApiResponse {
    Json(HealthResponse {
        message: "Healthy".to_string(),
        backend: state.backend().to_string(),
    })
}

pub fn health_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Health check")
        .description("Reports that the service is up and which storage backend it uses")
        .tag("Health")
        .response_with::<200, Json<HealthResponse>, _>(|res| {
            res.example(HealthResponse {
                message: "Healthy".to_string(),
                backend: "memory".to_string(),
            })
        })
}
