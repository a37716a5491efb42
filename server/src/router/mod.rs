use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{
    http::{header, HeaderValue, Method},
    Extension, Router,
};
use health::health_routes;
use openapi::{api_docs, docs_routes};
use std::sync::Arc;
use todos::todo_routes;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{settings::CorsOrigins, state::AppState};

pub mod health;
pub mod openapi;
pub mod todos;

pub fn setup_router(app_state: AppState) -> Router {
    aide::gen::on_error(|error| {
        warn!("OpenAPI generation: {error}");
    });

    aide::gen::extract_schemas(true);
    let mut api = OpenApi::default();

    let cors = cors_layer(&app_state.settings.cors_allow_origins);

    ApiRouter::new()
        .merge(health_routes())
        .merge(todo_routes())
        .merge(docs_routes())
        .finish_api_with(&mut api, api_docs)
        .layer(Extension(Arc::new(api)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// `*` allows any origin without credentials, an explicit list allows
/// credentials for exactly those origins
fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsOrigins::List(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin `{origin}`");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
        }
    }
}
