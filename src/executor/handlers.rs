use super::error::TaskError;
use super::manager::TaskManager;
use super::protocol::*;
use super::types::*;

use axum::response::{IntoResponse, Response};
use axum::{
    Extension, Json,
    extract::{Path, Query},
    http::StatusCode,
};
use std::sync::Arc;

/// HTTP wrapper around a [`TaskError`].
#[derive(Debug)]
pub struct ApiError(pub TaskError);

impl From<TaskError> for ApiError {
    fn from(error: TaskError) -> Self {
        Self(error)
    }
}

/// Status code a manager error maps to.
pub fn status_for(error: &TaskError) -> StatusCode {
    match error {
        TaskError::UnknownType(_) => StatusCode::BAD_REQUEST,
        TaskError::AlreadyExists(_) => StatusCode::CONFLICT,
        TaskError::QueueLimitReached { .. } => StatusCode::TOO_MANY_REQUESTS,
        TaskError::NotFound(_) => StatusCode::NOT_FOUND,
        TaskError::InProgress(_) => StatusCode::CONFLICT,
        TaskError::IdGeneration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        let message = if self.0.is_fatal() {
            tracing::error!("Internal error: {}", self.0);
            INTERNAL_SERVER_ERROR.to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub async fn handle_create_task(
    Extension(manager): Extension<Arc<TaskManager>>,
    Query(params): Query<CreateTaskParams>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task_type = params.task_type.unwrap_or_default();
    let task = manager.create_task(&task_type)?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn handle_get_task(
    Extension(manager): Extension<Arc<TaskManager>>,
    Path(task_id_str): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task_id = TaskId(task_id_str);
    let task = manager.get_task(&task_id)?;

    tracing::debug!("Task status query: {} -> {:?}", task_id, task.status);

    Ok(Json(task))
}

pub async fn handle_delete_task(
    Extension(manager): Extension<Arc<TaskManager>>,
    Path(task_id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    manager.delete_task(&TaskId(task_id_str))?;

    Ok(StatusCode::NO_CONTENT)
}
