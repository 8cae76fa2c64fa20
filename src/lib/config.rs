use std::time::Duration;

use clap::Parser;

/// Command-line and environment configuration for the shim.
#[derive(Debug, Clone, Parser)]
#[command(name = "task-shim", version, about = "Launches and tracks workload containers on this host")]
pub struct ShimConfig {
    /// Address the task API binds to
    #[arg(long, env = "SHIM_ADDRESS", default_value = "127.0.0.1")]
    pub address: String,

    /// Port the task API listens on
    #[arg(long, env = "SHIM_PORT", default_value_t = 10998)]
    pub port: u16,

    /// Seconds to wait for a container to stop when a request gives no timeout
    #[arg(long, env = "SHIM_STOP_TIMEOUT", default_value_t = 10)]
    pub stop_timeout: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "SHIM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ShimConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ShimConfig::try_parse_from(["task-shim"]).expect("defaults parse");
        assert_eq!(config.port, 10998);
        assert_eq!(config.stop_timeout(), Duration::from_secs(10));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn flags_override_defaults() {
        let config = ShimConfig::try_parse_from([
            "task-shim",
            "--address",
            "0.0.0.0",
            "--port",
            "8080",
            "--stop-timeout",
            "3",
        ])
        .expect("flags parse");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.stop_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(ShimConfig::try_parse_from(["task-shim", "--port", "http"]).is_err());
    }
}
