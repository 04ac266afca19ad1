use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::application::Application;
use crate::domain::commands::{RestartInstanceCommand, StartInstanceCommand, StopInstanceCommand};
use crate::domain::error::DomainError;
use crate::domain::queries::GetInstanceStatusQuery;

pub type AppState = Arc<Application>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps domain errors onto HTTP status codes
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::ProcessNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::DuplicateProcess(_)
            | DomainError::NotRunning(_)
            | DomainError::InvalidStateTransition { .. }
            | DomainError::RestartLimitExceeded(_) => StatusCode::CONFLICT,
            DomainError::InvalidCommand(_)
            | DomainError::InvalidName(_)
            | DomainError::InvalidConfiguration(_)
            | DomainError::MissingScript(_)
            | DomainError::ScriptNotFound(_)
            | DomainError::WorkingDirNotFound(_)
            | DomainError::UnknownEnvMode(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        debug!(status = %status, error = %self.0, "request failed");
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

pub async fn list_instances(State(app): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let response = app.list_instances().execute().await?;
    Ok(Json(response))
}

pub async fn get_instance(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let statuses = app
        .get_instance_status()
        .execute(GetInstanceStatusQuery::by_name(name))
        .await?;
    Ok(Json(statuses))
}

pub async fn start_instance(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app
        .start_instance()
        .execute(StartInstanceCommand::by_name(name))
        .await?;
    Ok(Json(response))
}

pub async fn stop_instance(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app
        .stop_instance()
        .execute(StopInstanceCommand::by_name(name))
        .await?;
    Ok(Json(response))
}

pub async fn restart_instance(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app
        .restart_instance()
        .execute(RestartInstanceCommand::by_name(name))
        .await?;
    Ok(Json(response))
}
