use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use todo_core::{StorageError, ValidationError};
use tracing::error;

pub type RestResult<T> = Result<T, RestError>;

/// Errors that stop the server from starting or serving
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Cannot open storage: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Cannot serve: {0}")]
    CannotServe(std::io::Error),
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingCredentials,
    #[error("Invalid authentication credentials")]
    InvalidCredentials,
}

/// Errors returned from request handlers
#[derive(Debug, Error)]
pub enum RestError {
    #[error("Request validation failed")]
    Validation(Vec<ValidationError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("Todo not found")]
    NotFound,
    #[error(transparent)]
    Authorization(#[from] AuthError),
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl From<ValidationError> for RestError {
    fn from(error: ValidationError) -> Self {
        if matches!(error, ValidationError::InvalidSortOrder(_)) {
            return RestError::BadRequest(error.to_string());
        }
        RestError::Validation(vec![error])
    }
}

/// Body of every non-validation error
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorDetail {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Body of a 422 response
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidationErrorBody {
    pub error: String,
    pub message: String,
    pub detail: Vec<FieldIssue>,
}

fn detail(status: StatusCode, detail: String) -> Response {
    (status, Json(ErrorDetail { detail })).into_response()
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        match self {
            RestError::Validation(errors) => {
                let body = ValidationErrorBody {
                    error: "ValidationError".to_string(),
                    message: "Request validation failed".to_string(),
                    detail: errors
                        .iter()
                        .map(|e| FieldIssue {
                            field: e.field().to_string(),
                            message: e.to_string(),
                        })
                        .collect(),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            RestError::BadRequest(message) => detail(StatusCode::BAD_REQUEST, message),
            RestError::NotFound => detail(StatusCode::NOT_FOUND, "Todo not found".to_string()),
            RestError::Authorization(e) => {
                let mut response = detail(StatusCode::UNAUTHORIZED, e.to_string());
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
                response
            }
            RestError::Storage(e) => {
                error!("Storage failure: {}", e);
                detail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}
