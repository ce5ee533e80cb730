//! Stateless HTTP request builder and envelope parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only the resource's base URL (for example
//! `http://localhost:3000/api/v1/todos`). Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes the `HttpResponse`, unwrapping the server's response envelope.

use serde::de::{DeserializeOwned, IgnoredAny};
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Envelope, Priority, Todo, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self, priority: Option<Priority>) -> HttpRequest {
        let url = match priority {
            Some(p) => format!("{}/?priority={p}", self.base_url),
            None => format!("{}/", self.base_url),
        };
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/createTodo", self.base_url),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_update_todo(&self, id: Uuid, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            url: format!("{}/updateTodo/{id}", self.base_url),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_delete_todo(&self, id: Uuid) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}/deleteTodo/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        data(parse_envelope(&response, 200)?)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        data(parse_envelope(&response, 201)?)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        data(parse_envelope(&response, 200)?)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_envelope::<IgnoredAny>(&response, 200)?;
        Ok(())
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json<T: serde::Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// Check the status and decode the envelope. A failure envelope becomes
/// `ApiError::Api`; 404 is always `NotFound`.
fn parse_envelope<T: DeserializeOwned>(
    response: &HttpResponse,
    expected: u16,
) -> Result<Envelope<T>, ApiError> {
    let status = response.status;
    if status == 404 {
        return Err(ApiError::NotFound);
    }
    if status != expected {
        return Err(match serde_json::from_str::<Envelope<IgnoredAny>>(&response.body) {
            Ok(envelope) => ApiError::Api {
                status,
                message: envelope.message,
                error: envelope.error.unwrap_or_default(),
            },
            Err(_) => ApiError::HttpError {
                status,
                body: response.body.clone(),
            },
        });
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn data<T>(envelope: Envelope<T>) -> Result<T, ApiError> {
    envelope
        .data
        .ok_or_else(|| ApiError::DeserializationError("response envelope has no data".to_string()))
}
