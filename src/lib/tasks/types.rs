use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use bollard::Docker;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::naming::generate_unique_name;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Terminated,
}

/// Launch parameters for a task, as received from the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_name: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub ports: Vec<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    pub container_id: Option<String>,
    pub termination_reason: Option<String>,
    pub termination_message: Option<String>,
    pub(crate) container_name: String,
    pub(crate) config: TaskConfig,
}

impl Task {
    /// Builds a pending task. The container name is derived here and never
    /// recomputed.
    pub fn new(config: TaskConfig) -> Self {
        Task {
            id: config.id.clone(),
            status: TaskStatus::Pending,
            container_id: None,
            termination_reason: None,
            termination_message: None,
            container_name: generate_unique_name(&config.name, &config.id),
            config,
        }
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn terminate(&mut self, reason: impl Into<String>, message: impl Into<String>) {
        self.status = TaskStatus::Terminated;
        self.termination_reason = Some(reason.into());
        self.termination_message = Some(message.into());
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to connect to docker: {0}")]
    Connect(String),
    #[error("failed to pull image {image}: {reason}")]
    PullImage { image: String, reason: String },
    #[error("failed to create container {name}: {reason}")]
    CreateContainer { name: String, reason: String },
    #[error("failed to start container {id}: {reason}")]
    StartContainer { id: String, reason: String },
    #[error("failed to stop container {id}: {reason}")]
    StopContainer { id: String, reason: String },
    #[error("failed to remove container {id}: {reason}")]
    RemoveContainer { id: String, reason: String },
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Creates and controls the container backing a task.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Starts a container named after the task and returns its id.
    async fn run(&self, task: &Task) -> RuntimeResult<String>;

    async fn stop(&self, container_id: &str, timeout: Duration) -> RuntimeResult<()>;

    async fn remove(&self, container_id: &str) -> RuntimeResult<()>;
}

#[derive(Debug, Clone)]
pub struct DockerRuntime {
    pub client: Docker,
}
