use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use modelbridge::{config, server};

#[derive(Parser)]
#[command(name = "modelbridge")]
#[command(version)]
#[command(about = "Demo backend bridging a browser model viewer to a cloud conversion platform")]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
    /// Directory of static viewer assets (overrides STATIC_DIR)
    #[arg(short, long)]
    static_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,modelbridge=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = config::read_config()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(static_dir) = cli.static_dir {
        config.static_dir = static_dir;
    }

    server::run(config).await
}
