use aide::{
    axum::{
        routing::{get_with, post_with},
        ApiRouter, IntoApiResponse,
    },
    transform::TransformOperation,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use todo_core::{paginate, TodoPatch};
use tracing::debug;

use crate::{
    auth::BasicAuth,
    errors::{ErrorDetail, RestError, RestResult, ValidationErrorBody},
    model::todo::{
        CreateTodoRequest, ListTodosParams, TodoDto, TodoPage, TodoPath, UpdateTodoRequest,
    },
    state::AppState,
};

pub fn todo_routes() -> ApiRouter<AppState> {
    ApiRouter::new()
        .api_route(
            "/api/v1/todos",
            post_with(create_todo, create_todo_docs).get_with(list_todos, list_todos_docs),
        )
        .api_route(
            "/api/v1/todos/:id",
            get_with(get_todo, get_todo_docs)
                .put_with(replace_todo, replace_todo_docs)
                .patch_with(update_todo, update_todo_docs)
                .delete_with(delete_todo, delete_todo_docs),
        )
}

async fn create_todo(
    _auth: BasicAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateTodoRequest>,
) -> impl IntoApiResponse {
    let result = request
        .into_new_todo()
        .and_then(|new| state.repository.create(new).map_err(RestError::from));

    match result {
        Ok(todo) => {
            debug!("Created todo {}", todo.id);
            (StatusCode::CREATED, Json(TodoDto::from(todo))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

fn create_todo_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create a todo")
        .description("Store a new todo. `completed` defaults to false.")
        .tag("todos")
        .response_with::<201, Json<TodoDto>, _>(|res| res.description("The created todo"))
        .response_with::<401, Json<ErrorDetail>, _>(|res| res.description("Not authenticated"))
        .response_with::<422, Json<ValidationErrorBody>, _>(|res| {
            res.description("Invalid title or due date")
        })
}

async fn list_todos(
    _auth: BasicAuth,
    State(state): State<AppState>,
    Query(params): Query<ListTodosParams>,
) -> impl IntoApiResponse {
    match list(&state, params) {
        Ok(page) => Json(page).into_response(),
        Err(e) => e.into_response(),
    }
}

fn list(state: &AppState, params: ListTodosParams) -> RestResult<TodoPage> {
    let query = params.into_query()?;
    let (items, total) = state.repository.list(&query)?;

    let page = paginate(items, total, query.limit as i64, query.offset as i64);
    Ok(page.map(TodoDto::from).into())
}

fn list_todos_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List todos")
        .description(
            "Filter by completion and search text, sort by `created_at` or `updated_at`, \
             then paginate. `total` counts every match before pagination.",
        )
        .tag("todos")
        .response_with::<200, Json<TodoPage>, _>(|res| res.description("One page of todos"))
        .response_with::<400, Json<ErrorDetail>, _>(|res| {
            res.description("`order` is neither `asc` nor `desc`")
        })
        .response_with::<401, Json<ErrorDetail>, _>(|res| res.description("Not authenticated"))
        .response_with::<422, Json<ValidationErrorBody>, _>(|res| {
            res.description("`limit` or `offset` out of range")
        })
}

async fn get_todo(
    _auth: BasicAuth,
    State(state): State<AppState>,
    Path(TodoPath { id }): Path<TodoPath>,
) -> impl IntoApiResponse {
    let result = state.repository.get(id).map_err(RestError::from);

    match result {
        Ok(Some(todo)) => Json(TodoDto::from(todo)).into_response(),
        Ok(None) => RestError::NotFound.into_response(),
        Err(e) => e.into_response(),
    }
}

fn get_todo_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get a todo")
        .tag("todos")
        .response_with::<200, Json<TodoDto>, _>(|res| res.description("The todo"))
        .response_with::<401, Json<ErrorDetail>, _>(|res| res.description("Not authenticated"))
        .response_with::<404, Json<ErrorDetail>, _>(|res| res.description("Todo not found"))
}

async fn replace_todo(
    _auth: BasicAuth,
    State(state): State<AppState>,
    Path(TodoPath { id }): Path<TodoPath>,
    Json(request): Json<CreateTodoRequest>,
) -> impl IntoApiResponse {
    let patch = request.into_new_todo().map(TodoPatch::from);
    apply_patch(&state, id, patch).into_response()
}

fn replace_todo_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Replace a todo")
        .description("Overwrite every field; omitted `description` and `due_date` are cleared.")
        .tag("todos")
        .response_with::<200, Json<TodoDto>, _>(|res| res.description("The replaced todo"))
        .response_with::<401, Json<ErrorDetail>, _>(|res| res.description("Not authenticated"))
        .response_with::<404, Json<ErrorDetail>, _>(|res| res.description("Todo not found"))
        .response_with::<422, Json<ValidationErrorBody>, _>(|res| {
            res.description("Invalid title or due date")
        })
}

async fn update_todo(
    _auth: BasicAuth,
    State(state): State<AppState>,
    Path(TodoPath { id }): Path<TodoPath>,
    Json(request): Json<UpdateTodoRequest>,
) -> impl IntoApiResponse {
    let patch = request.into_patch();
    apply_patch(&state, id, patch).into_response()
}

fn update_todo_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update a todo")
        .description(
            "Change only the fields present in the body. \
             `null` clears `description` or `due_date`.",
        )
        .tag("todos")
        .response_with::<200, Json<TodoDto>, _>(|res| res.description("The updated todo"))
        .response_with::<401, Json<ErrorDetail>, _>(|res| res.description("Not authenticated"))
        .response_with::<404, Json<ErrorDetail>, _>(|res| res.description("Todo not found"))
        .response_with::<422, Json<ValidationErrorBody>, _>(|res| {
            res.description("Invalid title or due date")
        })
}

fn apply_patch(state: &AppState, id: i64, patch: RestResult<TodoPatch>) -> RestResult<Json<TodoDto>> {
    let updated = state.repository.update(id, patch?)?;

    match updated {
        Some(todo) => {
            debug!("Updated todo {}", todo.id);
            Ok(Json(todo.into()))
        }
        None => Err(RestError::NotFound),
    }
}

async fn delete_todo(
    _auth: BasicAuth,
    State(state): State<AppState>,
    Path(TodoPath { id }): Path<TodoPath>,
) -> impl IntoApiResponse {
    match state.repository.delete(id) {
        Ok(true) => {
            debug!("Deleted todo {}", id);
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => RestError::NotFound.into_response(),
        Err(e) => RestError::from(e).into_response(),
    }
}

fn delete_todo_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete a todo")
        .tag("todos")
        .response_with::<204, (), _>(|res| res.description("The todo was removed"))
        .response_with::<401, Json<ErrorDetail>, _>(|res| res.description("Not authenticated"))
        .response_with::<404, Json<ErrorDetail>, _>(|res| res.description("Todo not found"))
}
