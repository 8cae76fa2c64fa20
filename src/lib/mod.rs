//! Task registry and deterministic container naming for a single-host
//! execution shim, plus the worker and HTTP API that drive it.

pub mod config;
pub mod tasks;
pub mod worker;
