pub mod docker;
pub mod naming;
pub mod state;
pub mod storage;
pub mod types;

pub use naming::generate_unique_name;
pub use storage::TaskStorage;
pub use types::{
    ContainerRuntime, DockerRuntime, RuntimeError, RuntimeResult, Task, TaskConfig, TaskStatus,
};
