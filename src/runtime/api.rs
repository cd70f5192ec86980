//! HTTP submission endpoint.
//!
//! `POST /fib` with `name`, `delay` and `value` fields (URL-encoded body or
//! query string) enqueues one job and answers `201 Created`. Invalid fields
//! answer `400` without enqueuing; other verbs answer `405` with `Allow: POST`.

use std::sync::Arc;

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::core::{DispatchError, Dispatcher, Task};

use super::submission::SubmissionForm;

/// Path of the submission endpoint.
pub const SUBMIT_PATH: &str = "/fib";

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Return a health payload.
pub async fn health() -> Json<Health> {
    Json(Health { ok: true })
}

/// Build the HTTP router around a dispatcher.
pub fn router<T: Task>(dispatcher: Arc<Dispatcher<T>>) -> Router {
    Router::new()
        .route(
            SUBMIT_PATH,
            post(submit_job::<T>).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .with_state(dispatcher)
}

async fn submit_job<T: Task>(
    State(dispatcher): State<Arc<Dispatcher<T>>>,
    query: Result<Query<SubmissionForm>, QueryRejection>,
    body: Result<Form<SubmissionForm>, FormRejection>,
) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let form = match body {
        Ok(Form(body)) => body.or(query),
        Err(_) => query,
    };

    let job = match form.into_job() {
        Ok(job) => job,
        Err(e) => {
            debug!(error = %e, "Submission rejected");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match dispatcher.submit_async(job).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(DispatchError::ShuttingDown) => {
            (StatusCode::SERVICE_UNAVAILABLE, "Dispatcher is shutting down").into_response()
        }
        Err(e) => {
            error!(error = %e, "Submission failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "Method not allowed",
    )
        .into_response()
}
