//! karir-fetch - the caching APIJobs proxy on its own

use clap::Parser;
use karir_core::KarirConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "karir-fetch", about = "Caching proxy in front of the APIJobs search API")]
struct Cli {
    /// Config file
    #[arg(short, long, env = "KARIR_CONFIG", default_value = "karir.toml")]
    config: PathBuf,
    #[arg(short, long)]
    port: Option<u16>,
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "karir=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = KarirConfig::load(&cli.config);
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }

    karir_gateway::start_fetch_service(&config).await
}
