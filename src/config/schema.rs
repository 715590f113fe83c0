//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both
//! deployments. All types derive Serde traits for deserialization from
//! config files, and every section falls back to its defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration shared by the file server and the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, admission capacity).
    pub listener: ListenerConfig,

    /// File-serving deployment settings.
    pub files: FileConfig,

    /// Relay deployment settings.
    pub proxy: RelayConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Optional deadlines.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to bind. Port 0 asks the OS for a free port.
    pub port: u16,

    /// Maximum connections handled at once (admission slots).
    pub max_connections: usize,
}

impl ListenerConfig {
    /// Address string in `host:port` form, for logging.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_connections: 10,
        }
    }
}

/// File server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    /// Directory that every served or uploaded path must resolve beneath.
    pub base_dir: PathBuf,

    /// Extensions (with leading dot) that may be served or uploaded.
    pub allowed_extensions: Vec<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("uploads"),
            allowed_extensions: [".html", ".txt", ".gif", ".jpeg", ".jpg", ".css"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Port used when the target URL names none.
    pub default_port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { default_port: 80 }
    }
}

/// Request parsing limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum bytes in the request line plus headers.
    pub max_head_bytes: usize,

    /// Maximum number of header fields.
    pub max_headers: usize,

    /// Maximum accepted upload body in bytes.
    pub max_body_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_head_bytes: 16 * 1024,
            max_headers: 100,
            max_body_bytes: 32 * 1024 * 1024, // 32MB
        }
    }
}

/// Deadlines. Absent values mean the operation waits indefinitely.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for reading the request head, in seconds.
    pub read_secs: Option<u64>,

    /// Deadline for dialing the origin, in seconds.
    pub connect_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn read(&self) -> Option<Duration> {
        self.read_secs.map(Duration::from_secs)
    }

    pub fn connect(&self) -> Option<Duration> {
        self.connect_secs.map(Duration::from_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Scrape endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_services() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.max_connections, 10);
        assert_eq!(config.proxy.default_port, 80);
        assert_eq!(config.files.allowed_extensions.len(), 6);
        assert!(config.timeouts.read().is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            port = 9000

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.listener.max_connections, 10);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.files.base_dir, PathBuf::from("uploads"));
    }
}
