//! Chatwire stress tools
//!
//! Load generators for a chatwire server: an echo round-trip tester and a
//! chat flood that keeps hundreds of clients talking at once.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;

use chatwire_client::cli::config::LoggingConfig;
use chatwire_client::cli::logging::init_logging;

mod commands;

#[derive(Parser)]
#[command(name = "chatwire-stress", about = "Chatwire stress tools - hammer a chat server")]
#[command(version, propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Round-trip a fixed packet list through an echo endpoint
    Echo {
        /// Server address
        #[arg(short, long, default_value = "localhost:8090")]
        addr: String,

        /// WebSocket path
        #[arg(short, long, default_value = "/")]
        path: String,

        /// Number of concurrent workers
        #[arg(short, long, default_value = "200")]
        workers: usize,
    },

    /// Keep many chat clients posting counters
    Flood {
        /// Server address
        #[arg(short, long, default_value = "localhost:8090")]
        addr: String,

        /// WebSocket path
        #[arg(short, long, default_value = "/")]
        path: String,

        /// Number of chat clients
        #[arg(short, long, default_value = "400")]
        clients: usize,

        /// Milliseconds between messages per client
        #[arg(short, long, default_value = "1000")]
        interval_ms: u64,
    },
}

fn ws_url(addr: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("ws://{}{}", addr, path)
    } else {
        format!("ws://{}/{}", addr, path)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig::default(), cli.verbose)?;

    match cli.command {
        Commands::Echo {
            addr,
            path,
            workers,
        } => {
            commands::echo::run(&ws_url(&addr, &path), workers).await
        }
        Commands::Flood {
            addr,
            path,
            clients,
            interval_ms,
        } => {
            commands::flood::run(
                &ws_url(&addr, &path),
                clients,
                Duration::from_millis(interval_ms),
            )
            .await
        }
    }
}
