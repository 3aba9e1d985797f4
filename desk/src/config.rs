//! Configuration management for the lending desk.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Store and desk behaviour
    pub desk: DeskConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Longest report window accepted, in days
pub const MAX_REPORT_WINDOW_DAYS: i64 = 3650;

/// Desk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Outcome events buffered for slow subscribers
    pub broadcast_capacity: usize,
    /// How long a facade call waits for its outcome, in milliseconds
    pub operation_timeout_ms: u64,
    /// Weekly report window in days
    pub report_window_days: i64,
    /// Load the demo catalog and requests at startup
    pub seed_demo_data: bool,
}

impl DeskConfig {
    /// Facade wait as a [`Duration`]
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Report window as a [`chrono::Duration`]
    ///
    /// Clamped to `1..=MAX_REPORT_WINDOW_DAYS`.
    #[must_use]
    pub fn report_window(&self) -> chrono::Duration {
        let days = self.report_window_days.clamp(1, MAX_REPORT_WINDOW_DAYS);
        chrono::Duration::try_days(days).unwrap_or(chrono::Duration::weeks(1))
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 256,
            operation_timeout_ms: 5000,
            report_window_days: crate::reports::DEFAULT_WINDOW_DAYS,
            seed_demo_data: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = DeskConfig::default();
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT").unwrap_or(8080),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
                metrics_host: env::var("METRICS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                metrics_port: parse_var("METRICS_PORT").unwrap_or(9090),
                shutdown_timeout: parse_var("SHUTDOWN_TIMEOUT").unwrap_or(30),
            },
            desk: DeskConfig {
                broadcast_capacity: parse_var("STORE_BROADCAST_CAPACITY")
                    .unwrap_or(defaults.broadcast_capacity),
                operation_timeout_ms: parse_var("OPERATION_TIMEOUT_MS")
                    .unwrap_or(defaults.operation_timeout_ms),
                report_window_days: parse_var("REPORT_WINDOW_DAYS")
                    .unwrap_or(defaults.report_window_days),
                seed_demo_data: parse_var("SEED_DEMO_DATA").unwrap_or(defaults.seed_demo_data),
            },
        }
    }

    /// Get the server bind address
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the metrics bind address
    #[must_use]
    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.server.metrics_host, self.server.metrics_port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}
