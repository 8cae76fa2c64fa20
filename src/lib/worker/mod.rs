pub mod api;
pub mod types;
pub mod worker;

pub use api::{ApiError, router};
pub use types::{TaskInfo, TaskList, TaskServer, TerminateRequest, Worker, WorkerError, WorkerResult};
pub use worker::spawn_launch;
