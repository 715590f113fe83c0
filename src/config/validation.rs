//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacity > 0, limits > 0, timeouts > 0)
//! - Check the extension allow-list shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.max_connections must be greater than zero")]
    ZeroCapacity,
    #[error("files.base_dir must not be empty")]
    EmptyBaseDir,
    #[error("files.allowed_extensions must not be empty")]
    NoExtensions,
    #[error("extension {0:?} must start with '.' and name a suffix")]
    BadExtension(String),
    #[error("proxy.default_port must not be zero")]
    ZeroDefaultPort,
    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("timeouts.{0} must be greater than zero when set")]
    ZeroTimeout(&'static str),
    #[error("unknown log level {0:?}")]
    LogLevel(String),
    #[error("metrics address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroCapacity);
    }

    if config.files.base_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyBaseDir);
    }
    if config.files.allowed_extensions.is_empty() {
        errors.push(ValidationError::NoExtensions);
    }
    for ext in &config.files.allowed_extensions {
        if !ext.starts_with('.') || ext.len() < 2 || ext.contains('/') {
            errors.push(ValidationError::BadExtension(ext.clone()));
        }
    }

    if config.proxy.default_port == 0 {
        errors.push(ValidationError::ZeroDefaultPort);
    }

    if config.limits.max_head_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("max_head_bytes"));
    }
    if config.limits.max_headers == 0 {
        errors.push(ValidationError::ZeroLimit("max_headers"));
    }

    if config.timeouts.read_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("read_secs"));
    }
    if config.timeouts.connect_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = ServerConfig::default();
        config.listener.max_connections = 0;
        config.files.allowed_extensions = vec!["html".into(), ".".into()];
        config.timeouts.connect_secs = Some(0);
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroCapacity,
                ValidationError::BadExtension("html".into()),
                ValidationError::BadExtension(".".into()),
                ValidationError::ZeroTimeout("connect_secs"),
                ValidationError::LogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MetricsAddress("nowhere".into())])
        );
    }
}
