//! Forward proxy: relays GET requests to their origin server.
//!
//! ```text
//! web-proxy 3128
//! curl -x http://127.0.0.1:3128 http://example.com/
//! ```

use clap::{CommandFactory, Parser};

use httpgate::cli::{self, CommonArgs};
use httpgate::routing::ServiceKind;

#[derive(Parser)]
#[command(name = "web-proxy", version)]
#[command(about = "HTTP/1.0 forward proxy with bounded concurrency", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    if args.common.is_incomplete() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = cli::resolve_config(&args.common, None)?;
    cli::launch(ServiceKind::Proxy, config).await
}
