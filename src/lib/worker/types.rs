use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tasks::{ContainerRuntime, RuntimeError, Task, TaskStatus, TaskStorage};

pub const REASON_CREATING_CONTAINER_ERROR: &str = "creating_container_error";
pub const REASON_TERMINATED_BY_USER: &str = "terminated_by_user";

/// Drives task lifecycles on this host through the registry and a container
/// runtime.
#[derive(Clone)]
pub struct Worker {
    pub storage: Arc<TaskStorage>,
    pub runtime: Arc<dyn ContainerRuntime>,
    pub stop_timeout: Duration,
}

pub struct TaskServer {
    pub worker: Worker,
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TerminateRequest {
    /// Seconds to wait for a graceful stop. Falls back to the worker default.
    pub timeout: Option<u64>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: String,
    pub status: TaskStatus,
    pub container_name: String,
    pub container_id: Option<String>,
    pub termination_reason: Option<String>,
    pub termination_message: Option<String>,
}

impl From<&Task> for TaskInfo {
    fn from(task: &Task) -> Self {
        TaskInfo {
            id: task.id.clone(),
            status: task.status,
            container_name: task.container_name().to_string(),
            container_id: task.container_id.clone(),
            termination_reason: task.termination_reason.clone(),
            termination_message: task.termination_message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    pub ids: Vec<String>,
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("task {0} already exists")]
    TaskAlreadyExists(String),
    #[error("task {0} not found")]
    TaskNotFound(String),
    #[error("task {0} is not terminated")]
    TaskNotTerminated(String),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type WorkerResult<T> = Result<T, WorkerError>;
