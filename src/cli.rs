//! Command-line surface shared by both binaries.
//!
//! Values given on the command line override the config file, which
//! overrides built-in defaults.

use std::path::PathBuf;

use clap::Args;

use crate::config::{load_config, validate_config, ConfigError, ServerConfig};
use crate::lifecycle;
use crate::observability::init_logging;
use crate::routing::ServiceKind;

/// Options common to every deployment.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Port to listen on
    pub port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of concurrently served connections
    #[arg(long, value_name = "N")]
    pub max_connections: Option<usize>,
}

impl CommonArgs {
    /// Without a port or a config file there is nothing to listen on.
    pub fn is_incomplete(&self) -> bool {
        self.port.is_none() && self.config.is_none()
    }
}

/// Build the effective configuration: file (if any), then overrides, then validation.
pub fn resolve_config(args: &CommonArgs, base_dir: Option<PathBuf>) -> Result<ServerConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    if let Some(port) = args.port {
        config.listener.port = port;
    }
    if let Some(max) = args.max_connections {
        config.listener.max_connections = max;
    }
    if let Some(dir) = base_dir {
        config.files.base_dir = dir;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Initialize logging and serve `kind` until a shutdown signal.
pub async fn launch(kind: ServiceKind, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&config.observability)?;

    tracing::info!(
        service = %kind,
        version = env!("CARGO_PKG_VERSION"),
        address = %config.listener.bind_address(),
        max_connections = config.listener.max_connections,
        "Starting"
    );
    if kind == ServiceKind::FileServer {
        tracing::info!(base_dir = %config.files.base_dir.display(), "Serving files");
    }

    lifecycle::serve(kind, config).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(port: Option<u16>, config: Option<PathBuf>) -> CommonArgs {
        CommonArgs {
            port,
            config,
            max_connections: None,
        }
    }

    #[test]
    fn missing_port_and_file_is_incomplete() {
        assert!(args(None, None).is_incomplete());
        assert!(!args(Some(8080), None).is_incomplete());
        assert!(!args(None, Some("gate.toml".into())).is_incomplete());
    }

    #[test]
    fn command_line_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nport = 9000\nmax_connections = 3").unwrap();

        let mut cli = args(Some(9100), Some(file.path().to_path_buf()));
        cli.max_connections = Some(5);
        let config = resolve_config(&cli, Some("site".into())).unwrap();

        assert_eq!(config.listener.port, 9100);
        assert_eq!(config.listener.max_connections, 5);
        assert_eq!(config.files.base_dir, PathBuf::from("site"));
    }

    #[test]
    fn overrides_are_validated() {
        let mut cli = args(Some(8080), None);
        cli.max_connections = Some(0);
        assert!(matches!(resolve_config(&cli, None), Err(ConfigError::Validation(_))));
    }
}
