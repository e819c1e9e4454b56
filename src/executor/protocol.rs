//! HTTP Protocol Definitions
//!
//! Request and response bodies of the public task API.

use serde::{Deserialize, Serialize};

pub const ENDPOINT_TASKS: &str = "/tasks";
pub const ENDPOINT_TASK_BY_ID: &str = "/tasks/:id";

/// Message returned for failures the client cannot act on.
pub const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// Query string of `POST /tasks`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateTaskParams {
    #[serde(rename = "type")]
    pub task_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
