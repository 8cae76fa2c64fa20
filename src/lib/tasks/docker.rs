use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use bollard::{
    Docker,
    container::{
        Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions,
        StopContainerOptions,
    },
    image::CreateImageOptions,
    models::{HostConfig, RestartPolicy, RestartPolicyNameEnum},
};
use futures_util::stream::StreamExt;
use tracing::{debug, info};

use super::types::{ContainerRuntime, DockerRuntime, RuntimeError, RuntimeResult, Task};

impl DockerRuntime {
    pub fn new() -> RuntimeResult<Self> {
        let client = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Connect(e.to_string()))?;

        Ok(DockerRuntime { client })
    }

    async fn pull_image(&self, image: &str) -> RuntimeResult<()> {
        info!(image, "pulling image");

        let mut stream = self.client.create_image(
            Some(CreateImageOptions {
                from_image: image.to_string(),
                ..Default::default()
            }),
            None,
            None,
        );

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(progress) => {
                    if let Some(status) = progress.status {
                        debug!(image, %status, "pull progress");
                    }
                }
                Err(e) => {
                    return Err(RuntimeError::PullImage {
                        image: image.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(image, "image pulled");
        Ok(())
    }
}

fn env_list(env: &HashMap<String, String>) -> Vec<String> {
    let mut vars: Vec<String> = env.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    vars.sort();
    vars
}

// Docker treats a negative timeout as "wait forever".
fn stop_timeout_secs(timeout: Duration) -> i64 {
    i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX)
}

fn container_config(task: &Task) -> Config<String> {
    let cfg = task.config();

    let host_config = HostConfig {
        restart_policy: Some(RestartPolicy {
            name: Some(RestartPolicyNameEnum::NO),
            maximum_retry_count: None,
        }),
        publish_all_ports: Some(!cfg.ports.is_empty()),
        ..Default::default()
    };

    let exposed_ports = cfg
        .ports
        .iter()
        .map(|port| (format!("{}/tcp", port), HashMap::new()))
        .collect();

    Config {
        image: Some(cfg.image_name.clone()),
        cmd: (!cfg.commands.is_empty()).then(|| cfg.commands.clone()),
        env: Some(env_list(&cfg.env)),
        exposed_ports: Some(exposed_ports),
        host_config: Some(host_config),
        ..Default::default()
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn run(&self, task: &Task) -> RuntimeResult<String> {
        let name = task.container_name();
        self.pull_image(&task.config().image_name).await?;

        let options = Some(CreateContainerOptions {
            name: name.to_string(),
            ..Default::default()
        });

        let created = self
            .client
            .create_container(options, container_config(task))
            .await
            .map_err(|e| RuntimeError::CreateContainer {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        info!(container_name = name, container_id = %created.id, "container created");

        self.client
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| RuntimeError::StartContainer {
                id: created.id.clone(),
                reason: e.to_string(),
            })?;
        info!(container_name = name, container_id = %created.id, "container started");

        Ok(created.id)
    }

    async fn stop(&self, container_id: &str, timeout: Duration) -> RuntimeResult<()> {
        info!(container_id, timeout_secs = timeout.as_secs(), "stopping container");

        let options = StopContainerOptions {
            t: stop_timeout_secs(timeout),
        };
        self.client
            .stop_container(container_id, Some(options))
            .await
            .map_err(|e| RuntimeError::StopContainer {
                id: container_id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn remove(&self, container_id: &str) -> RuntimeResult<()> {
        info!(container_id, "removing container");

        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        self.client
            .remove_container(container_id, Some(options))
            .await
            .map_err(|e| RuntimeError::RemoveContainer {
                id: container_id.to_string(),
                reason: e.to_string(),
            })
    }
}
