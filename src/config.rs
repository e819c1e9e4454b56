//! Runtime configuration, from command-line flags or `TASK_RUNNER_*` env vars.

use crate::executor::manager::{DEFAULT_QUEUE_CAPACITY, DEFAULT_TICK_INTERVAL_MS, ManagerConfig};
use crate::executor::simulated::DEFAULT_FAILURE_PERCENT;

use clap::Parser;
use clap::builder::TypedValueParser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "task-runner", about = "Asynchronous task execution service")]
pub struct Config {
    /// Address the HTTP server listens on.
    #[arg(long, env = "TASK_RUNNER_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Maximum pending + running tasks per task type.
    #[arg(
        long,
        env = "TASK_RUNNER_QUEUE_CAPACITY",
        default_value_t = DEFAULT_QUEUE_CAPACITY,
        value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize)
    )]
    pub queue_capacity: usize,

    /// Interval between duration updates of a running task, in milliseconds.
    #[arg(
        long,
        env = "TASK_RUNNER_TICK_INTERVAL_MS",
        default_value_t = DEFAULT_TICK_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_interval_ms: u64,

    /// How long in-flight HTTP requests may take to finish after a shutdown signal.
    #[arg(long, env = "TASK_RUNNER_SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    pub shutdown_grace_secs: u64,

    /// Failure probability of the built-in simulated task, in percent.
    #[arg(
        long,
        env = "TASK_RUNNER_FAILURE_PERCENT",
        default_value_t = DEFAULT_FAILURE_PERCENT,
        value_parser = clap::value_parser!(u32).range(0..=100)
    )]
    pub failure_percent: u32,
}

impl Config {
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            queue_capacity: self.queue_capacity,
            tick_interval: Duration::from_millis(self.tick_interval_ms),
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["task-runner"]).unwrap();

        assert_eq!(config.bind, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.failure_percent, 40);
        assert_eq!(config.shutdown_grace(), Duration::from_secs(5));
        assert_eq!(
            config.manager_config().tick_interval,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "task-runner",
            "--bind",
            "127.0.0.1:9000",
            "--queue-capacity",
            "3",
            "--tick-interval-ms",
            "50",
        ])
        .unwrap();

        let manager_config = config.manager_config();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(manager_config.queue_capacity, 3);
        assert_eq!(manager_config.tick_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_defaults_match_manager_defaults() {
        let config = Config::try_parse_from(["task-runner"]).unwrap();
        let defaults = ManagerConfig::default();

        assert_eq!(config.manager_config().queue_capacity, defaults.queue_capacity);
        assert_eq!(config.manager_config().tick_interval, defaults.tick_interval);
    }

    #[test]
    fn test_queue_capacity_parses_into_usize() {
        let config = Config::try_parse_from(["task-runner", "--queue-capacity", "250"]).unwrap();
        assert_eq!(config.queue_capacity, 250usize);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result = Config::try_parse_from(["task-runner", "--queue-capacity", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_failure_percent_over_100() {
        let result = Config::try_parse_from(["task-runner", "--failure-percent", "101"]);
        assert!(result.is_err());
    }
}
