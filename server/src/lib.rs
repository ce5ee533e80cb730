//! Todo list REST API over a document store.
//!
//! # Overview
//! Four operations (create, list, update, delete) on a single `Todo` entity,
//! exposed under `/api/v1/todos` with a uniform JSON envelope
//! `{message, success, data?, error?}`.
//!
//! # Design
//! - `model` owns the record schema and input validation.
//! - `store` defines the persistence contract (`TodoStore`) and the
//!   `MemoryStore` document store, optionally snapshotted to a JSON file.
//! - `service` runs the operations against an explicitly passed store handle.
//! - `routes` maps HTTP verbs and paths onto the service and shapes responses.

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod service;
pub mod store;

use std::future::Future;

use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::Config;
pub use error::{StorageError, TodoError};
pub use model::{CreateTodo, NewTodo, Priority, Todo, TodoPatch, UpdateTodo};
pub use routes::{app, ApiResponse, API_PREFIX};
pub use service::TodoService;
pub use store::{MemoryStore, TodoStore};

/// Serve the API on `listener` until Ctrl-C.
pub async fn run(listener: TcpListener, service: TodoService) -> Result<(), std::io::Error> {
    run_until(listener, service, shutdown_signal()).await
}

/// Serve the API until `shutdown` resolves, letting in-flight requests finish.
pub async fn run_until<F>(
    listener: TcpListener,
    service: TodoService,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(service))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
