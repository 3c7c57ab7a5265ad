use anyhow::{Context, Result};
use clap::Parser;
use shop_throttler::config::Config;
use shop_throttler::server::Server;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "shop-throttler", version, about = "Per-client rate limiting for the order API")]
struct Cli {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(long)]
    bind_addr: Option<SocketAddr>,

    /// Log level for this crate (overrides LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(bind_addr) = cli.bind_addr {
        config.bind_addr = bind_addr;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("shop_throttler={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting shop-throttler");
    tracing::info!(
        bind_addr = %config.bind_addr,
        order_window_ms = config.order_window_ms,
        order_max_events = config.order_max_events,
        request_window_ms = config.request_window_ms,
        request_max_events = config.request_max_events,
        cleanup_interval_ms = config.cleanup_interval_ms,
        "Configuration loaded"
    );

    let server = Server::new(config).context("Failed to create server")?;
    server.run().await.context("Server error")?;

    Ok(())
}
