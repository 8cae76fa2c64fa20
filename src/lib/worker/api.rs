use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, info};

use super::{
    types::{TaskInfo, TaskList, TaskServer, TerminateRequest, Worker, WorkerError},
    worker::spawn_launch,
};
use crate::tasks::TaskConfig;

/// Error body returned by every endpoint: `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Worker(WorkerError),
}

impl From<WorkerError> for ApiError {
    fn from(err: WorkerError) -> Self {
        ApiError::Worker(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Worker(WorkerError::TaskAlreadyExists(_))
            | ApiError::Worker(WorkerError::TaskNotTerminated(_)) => StatusCode::CONFLICT,
            ApiError::Worker(WorkerError::TaskNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Worker(WorkerError::Runtime(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Worker(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({
        "service": "task-shim",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn list_tasks(State(worker): State<Worker>) -> Json<TaskList> {
    Json(TaskList {
        ids: worker.list_tasks(),
    })
}

pub async fn submit_task(
    State(worker): State<Worker>,
    Json(config): Json<TaskConfig>,
) -> ApiResult<TaskInfo> {
    let task = worker.submit(config)?;
    spawn_launch(worker, task.id.clone());
    Ok(Json(TaskInfo::from(&task)))
}

pub async fn get_task(State(worker): State<Worker>, Path(id): Path<String>) -> ApiResult<TaskInfo> {
    debug!(task_id = %id, "task info requested");
    let task = worker.get_task(&id)?;
    Ok(Json(TaskInfo::from(&task)))
}

pub async fn terminate_task(
    State(worker): State<Worker>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<TaskInfo> {
    let request =
        parse_terminate_request(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let task = worker.terminate(&id, request).await?;
    Ok(Json(TaskInfo::from(&task)))
}

/// An empty body means "use the defaults".
fn parse_terminate_request(body: &[u8]) -> serde_json::Result<TerminateRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TerminateRequest::default());
    }
    serde_json::from_slice(body)
}

pub async fn remove_task(
    State(worker): State<Worker>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    worker.remove(&id).await?;
    Ok(StatusCode::OK)
}

pub fn router(worker: Worker) -> Router {
    Router::new()
        .route("/api/healthcheck", get(healthcheck))
        .route("/api/tasks", get(list_tasks).post(submit_task))
        .route("/api/tasks/{id}", get(get_task))
        .route("/api/tasks/{id}/terminate", post(terminate_task))
        .route("/api/tasks/{id}/remove", post(remove_task))
        .with_state(worker)
}

impl TaskServer {
    pub fn new(worker: Worker, address: impl Into<String>) -> Self {
        Self {
            worker,
            address: address.into(),
        }
    }

    pub async fn start_server(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.address).await?;
        info!(address = %self.address, "task server listening");

        axum::serve(listener, router(self.worker)).await
    }
}
