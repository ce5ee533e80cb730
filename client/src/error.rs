//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers routinely branch on
//! "that todo is gone". Any other failure envelope lands in `Api` with the
//! server's message and error text; responses that are not an envelope at
//! all land in `HttpError` with the raw body.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("todo not found")]
    NotFound,

    /// The server answered with a failure envelope.
    #[error("HTTP {status}: {message}: {error}")]
    Api {
        status: u16,
        message: String,
        error: String,
    },

    /// Unexpected status without a parseable envelope.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
