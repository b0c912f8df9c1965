//! HTTP request handlers for the VR/VA benefit engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::pipeline::run_pipeline;

use super::request::AskRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/runs", post(run_handler))
        .route("/ask", post(ask_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Handler for POST /runs.
///
/// Runs the whole pipeline with the server's configuration and returns the
/// run summary.
async fn run_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing run request");

    let config = state.config_handle();
    let start_time = Instant::now();
    let result = tokio::task::spawn_blocking(move || run_pipeline(&config)).await;

    match result {
        Ok(Ok(report)) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %report.summary.run_id,
                records = report.records.len(),
                total = %report.summary.totals.total,
                duration_ms = start_time.elapsed().as_millis(),
                "Run completed successfully"
            );
            json_response(StatusCode::OK, report.summary)
        }
        Ok(Err(err)) => {
            warn!(correlation_id = %correlation_id, error = %err, "Run failed");
            error_response(err.into())
        }
        Err(join_error) => {
            warn!(correlation_id = %correlation_id, error = %join_error, "Run task aborted");
            error_response(ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("RUN_ABORTED", "Run task aborted", join_error.to_string()),
            ))
        }
    }
}

/// Handler for POST /ask.
///
/// Answers a question about the benefit policy document.
async fn ask_handler(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing ask request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
                    ApiError::validation_error(body_text)
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    let Some(question) = request.question() else {
        return error_response(
            EngineError::InvalidRequest {
                message: "question must not be empty".to_string(),
            }
            .into(),
        );
    };

    let Some(assistant) = state.assistant() else {
        warn!(correlation_id = %correlation_id, "Assistant not configured");
        return json_response(StatusCode::SERVICE_UNAVAILABLE, ApiError::assistant_unavailable());
    };

    match assistant.ask(question) {
        Some(answer) => {
            info!(
                correlation_id = %correlation_id,
                sources = answer.sources.len(),
                "Question answered"
            );
            json_response(StatusCode::OK, answer)
        }
        None => {
            warn!(correlation_id = %correlation_id, "Assistant has no index");
            json_response(StatusCode::SERVICE_UNAVAILABLE, ApiError::assistant_unavailable())
        }
    }
}
