#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::Notify;
use task_shim::{
    tasks::{ContainerRuntime, RuntimeError, RuntimeResult, Task, TaskConfig, TaskStorage},
    worker::Worker,
};

/// Records runtime calls instead of talking to docker.
#[derive(Default)]
pub struct FakeRuntime {
    pub fail_run: bool,
    /// When set, `run` signals `run_entered` and waits for this before returning.
    pub run_gate: Option<Arc<Notify>>,
    pub run_entered: Notify,
    pub started: Mutex<Vec<String>>,
    pub stopped: Mutex<Vec<(String, Duration)>>,
    pub removed: Mutex<Vec<String>>,
}

impl FakeRuntime {
    pub fn failing() -> Self {
        FakeRuntime {
            fail_run: true,
            ..Default::default()
        }
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        FakeRuntime {
            run_gate: Some(gate),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn run(&self, task: &Task) -> RuntimeResult<String> {
        if let Some(gate) = &self.run_gate {
            self.run_entered.notify_one();
            gate.notified().await;
        }
        if self.fail_run {
            return Err(RuntimeError::CreateContainer {
                name: task.container_name().to_string(),
                reason: "name already in use".to_string(),
            });
        }
        self.started
            .lock()
            .unwrap()
            .push(task.container_name().to_string());
        Ok(format!("container-{}", task.id))
    }

    async fn stop(&self, container_id: &str, timeout: Duration) -> RuntimeResult<()> {
        self.stopped
            .lock()
            .unwrap()
            .push((container_id.to_string(), timeout));
        Ok(())
    }

    async fn remove(&self, container_id: &str) -> RuntimeResult<()> {
        self.removed.lock().unwrap().push(container_id.to_string());
        Ok(())
    }
}

pub fn worker_with(runtime: Arc<FakeRuntime>) -> Worker {
    Worker::new(
        Arc::new(TaskStorage::new()),
        runtime,
        Duration::from_secs(10),
    )
}

pub fn vllm_config() -> TaskConfig {
    TaskConfig {
        id: "66a886db-86db-4cf9-8c06-8984ad15dde2".to_string(),
        name: "vllm-0-0".to_string(),
        image_name: "vllm/vllm-openai:latest".to_string(),
        ..Default::default()
    }
}
