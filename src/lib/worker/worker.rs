use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use super::types::{
    REASON_CREATING_CONTAINER_ERROR, REASON_TERMINATED_BY_USER, TerminateRequest, Worker,
    WorkerError, WorkerResult,
};
use crate::tasks::{ContainerRuntime, Task, TaskConfig, TaskStatus, TaskStorage};

impl Worker {
    pub fn new(
        storage: Arc<TaskStorage>,
        runtime: Arc<dyn ContainerRuntime>,
        stop_timeout: Duration,
    ) -> Self {
        Worker {
            storage,
            runtime,
            stop_timeout,
        }
    }

    pub fn get_task(&self, id: &str) -> WorkerResult<Task> {
        self.storage
            .get(id)
            .ok_or_else(|| WorkerError::TaskNotFound(id.to_string()))
    }

    pub fn list_tasks(&self) -> Vec<String> {
        self.storage.ids()
    }

    /// Registers a new pending task. The container is not created until
    /// [`Worker::launch`] runs.
    pub fn submit(&self, config: TaskConfig) -> WorkerResult<Task> {
        let task = Task::new(config);
        if !self.storage.add(task.clone()) {
            return Err(WorkerError::TaskAlreadyExists(task.id));
        }

        info!(task_id = %task.id, container_name = task.container_name(), "task submitted");
        Ok(task)
    }

    /// Creates the container for a task. The outcome is applied to the
    /// stored record as it is after `run` returns, so a termination that
    /// lands while the container is starting is kept and the new container
    /// is stopped.
    pub async fn launch(&self, id: &str) -> WorkerResult<Task> {
        let task = self.get_task(id)?;

        let container_id = match self.runtime.run(&task).await {
            Ok(container_id) => container_id,
            Err(e) => {
                error!(task_id = %task.id, error = %e, "failed to launch task");
                let message = e.to_string();
                self.storage
                    .modify(id, |stored| {
                        if !stored.status.is_terminal() {
                            stored.terminate(REASON_CREATING_CONTAINER_ERROR, message);
                        }
                    })
                    .ok_or_else(|| WorkerError::TaskNotFound(id.to_string()))?;
                return Err(e.into());
            }
        };

        let recorded = self.storage.modify(id, |stored| {
            stored.container_id = Some(container_id.clone());
            if stored.status.is_terminal() {
                return;
            }
            if !stored.status.can_transition_to(&TaskStatus::Running) {
                warn!(
                    task_id = %stored.id,
                    from = ?stored.status,
                    to = ?TaskStatus::Running,
                    "out-of-order status transition"
                );
            }
            stored.status = TaskStatus::Running;
        });

        let Some(task) = recorded else {
            warn!(
                task_id = %id,
                %container_id,
                "task removed while launching, dropping container"
            );
            self.runtime.remove(&container_id).await?;
            return Err(WorkerError::TaskNotFound(id.to_string()));
        };

        if task.status.is_terminal() {
            info!(
                task_id = %task.id,
                %container_id,
                "task terminated while launching, stopping container"
            );
            self.runtime.stop(&container_id, self.stop_timeout).await?;
            return Ok(task);
        }

        info!(task_id = %task.id, %container_id, "task running");
        Ok(task)
    }

    pub async fn terminate(&self, id: &str, request: TerminateRequest) -> WorkerResult<Task> {
        let task = self.get_task(id)?;
        if task.status.is_terminal() {
            debug!(task_id = %task.id, "task already terminated");
            return Ok(task);
        }

        let timeout = request
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(self.stop_timeout);
        if let Some(container_id) = &task.container_id {
            self.runtime.stop(container_id, timeout).await?;
        }

        let reason = request
            .reason
            .unwrap_or_else(|| REASON_TERMINATED_BY_USER.to_string());
        let message = request.message.unwrap_or_default();
        let terminated = self
            .storage
            .modify(id, |stored| {
                if !stored.status.is_terminal() {
                    stored.terminate(reason, message);
                }
            })
            .ok_or_else(|| WorkerError::TaskNotFound(id.to_string()))?;

        // A launch may have recorded its container after the first read.
        if let Some(container_id) = &terminated.container_id {
            if task.container_id.as_ref() != Some(container_id) {
                self.runtime.stop(container_id, timeout).await?;
            }
        }

        info!(task_id = %terminated.id, "task terminated");
        Ok(terminated)
    }

    pub async fn remove(&self, id: &str) -> WorkerResult<()> {
        let task = self.get_task(id)?;
        if !task.status.is_terminal() {
            return Err(WorkerError::TaskNotTerminated(task.id));
        }

        if let Some(container_id) = &task.container_id {
            self.runtime.remove(container_id).await?;
        }

        self.storage.delete(&task.id);
        info!(task_id = %task.id, "task removed");
        Ok(())
    }
}

/// Launches a submitted task in the background.
pub fn spawn_launch(worker: Worker, id: String) {
    tokio::spawn(async move {
        if let Err(e) = worker.launch(&id).await {
            debug!(task_id = %id, error = %e, "background launch finished with error");
        }
    });
}
