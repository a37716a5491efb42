use std::sync::Arc;

use aide::{
    axum::{routing::get, ApiRouter, IntoApiResponse},
    openapi::{OpenApi, Tag},
    redoc::Redoc,
    transform::TransformOpenApi,
};
use axum::{response::IntoResponse, Extension, Json};

use crate::state::AppState;

pub fn docs_routes() -> ApiRouter<AppState> {
    ApiRouter::new()
        .route(
            "/docs",
            Redoc::new("/openapi.json")
                .with_title("Todo Backend")
                .axum_route(),
        )
        .route("/openapi.json", get(serve_api))
}

async fn serve_api(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    Json(&*api).into_response()
}

pub fn api_docs(api: TransformOpenApi) -> TransformOpenApi {
    api.title("Todo Backend")
        .summary("CRUD service for todo items")
        .description("Create, read, update, delete and list todos with filtering, sorting and pagination.")
        .tag(Tag {
            name: "todos".into(),
            description: Some("Todo management".into()),
            ..Default::default()
        })
}
