//! HTTP resource mapping for the todo API.
//!
//! # Design
//! Every response, success or failure, is an `ApiResponse` envelope. Handlers
//! take their extractors as `Result<_, Rejection>` so that a malformed body or
//! query string is reported through the envelope as a validation failure
//! rather than axum's plain-text rejection. Path ids are taken as strings: an
//! id that is not a UUID cannot name a stored todo and is reported as not
//! found.

use std::fmt;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::TodoError;
use crate::model::{CreateTodo, Priority, Todo, UpdateTodo};
use crate::service::TodoService;

/// Path prefix the todo resource is mounted under.
pub const API_PREFIX: &str = "/api/v1/todos";

const WELCOME: &str = "Welcome to the Todo API!";

/// Uniform JSON wrapper returned by every todo endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            message: message.to_string(),
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn ok_empty(message: &str) -> Self {
        Self {
            message: message.to_string(),
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn failure(message: &str, error: String) -> Self {
        Self {
            message: message.to_string(),
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// A failed operation: the operation's failure message plus the cause.
#[derive(Debug)]
pub struct ApiError {
    message: &'static str,
    source: TodoError,
}

impl ApiError {
    fn new(message: &'static str, source: TodoError) -> Self {
        Self { message, source }
    }
}

/// `map_err` adapter tagging a `TodoError` with the operation that failed.
fn failed(message: &'static str) -> impl FnOnce(TodoError) -> ApiError {
    move |source| ApiError::new(message, source)
}

/// `map_err` adapter turning an extractor rejection into a validation failure.
fn rejected<E: fmt::Display>(message: &'static str) -> impl FnOnce(E) -> ApiError {
    move |rejection| ApiError::new(message, TodoError::validation(rejection.to_string()))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.source.status();
        let message = match self.source {
            TodoError::NotFound(_) => "Todo not found",
            _ => self.message,
        };
        if status.is_server_error() {
            error!(error = %self.source, "{message}");
        } else {
            warn!(error = %self.source, "{message}");
        }
        let body = ApiResponse::failure(message, self.source.to_string());
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub priority: Option<String>,
}

pub fn app(service: TodoService) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route(API_PREFIX, get(list_todos))
        .route("/api/v1/todos/", get(list_todos))
        .route("/api/v1/todos/createTodo", post(create_todo))
        .route(
            "/api/v1/todos/updateTodo/{id}",
            put(update_todo).patch(update_todo),
        )
        .route("/api/v1/todos/deleteTodo/{id}", delete(delete_todo))
        .with_state(service)
}

async fn welcome() -> &'static str {
    WELCOME
}

fn parse_id(raw: &str) -> Result<Uuid, TodoError> {
    Uuid::parse_str(raw).map_err(|_| TodoError::NotFound(raw.to_string()))
}

async fn list_todos(
    State(service): State<TodoService>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Todo>>>, ApiError> {
    const FAILED: &str = "Failed to load todos";
    let Query(params) = query.map_err(rejected(FAILED))?;
    // An empty `?priority=` means no filter.
    let priority = params
        .priority
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(str::parse::<Priority>)
        .transpose()
        .map_err(failed(FAILED))?;
    let todos = service.list(priority).await.map_err(failed(FAILED))?;
    Ok(Json(ApiResponse::ok("Todos fetched successfully", todos)))
}

async fn create_todo(
    State(service): State<TodoService>,
    body: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Todo>>), ApiError> {
    const FAILED: &str = "Failed to create todo";
    let Json(input) = body.map_err(rejected(FAILED))?;
    let todo = service.create(input).await.map_err(failed(FAILED))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Todo created successfully", todo)),
    ))
}

async fn update_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    const FAILED: &str = "Error updating Todo";
    let id = parse_id(&id).map_err(failed(FAILED))?;
    // A missing todo is reported as such even when the body is unusable.
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => {
            service.ensure_exists(id).await.map_err(failed(FAILED))?;
            return Err(rejected(FAILED)(rejection));
        }
    };
    let todo = service.update(id, input).await.map_err(failed(FAILED))?;
    Ok(Json(ApiResponse::ok("Todo updated successfully", todo)))
}

async fn delete_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    const FAILED: &str = "Failed to delete todo";
    let id = parse_id(&id).map_err(failed(FAILED))?;
    service.delete(id).await.map_err(failed(FAILED))?;
    Ok(Json(ApiResponse::ok_empty("Todo deleted successfully")))
}
