//! File server: serves GET and accepts POST uploads from a base directory.
//!
//! ```text
//! http-server 8080 --base-dir ./site
//! ```

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use httpgate::cli::{self, CommonArgs};
use httpgate::routing::ServiceKind;

#[derive(Parser)]
#[command(name = "http-server", version)]
#[command(about = "HTTP/1.0 file server with bounded concurrency", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory files are served from and uploaded into
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    if args.common.is_incomplete() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = cli::resolve_config(&args.common, args.base_dir)?;
    cli::launch(ServiceKind::FileServer, config).await
}
