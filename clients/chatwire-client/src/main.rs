//! Chatwire CLI Entry Point
//!
//! Terminal chat client for the chatwire server.

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tracing::info;

use chatwire_client::chat::session::render_event;
use chatwire_client::cli::config::Config;
use chatwire_client::cli::logging::init_logging;
use chatwire_client::{
    Bubble, BubbleKind, ChatError, ChatHandle, ChatView, ParseMode, SessionIdentity, TerminalView,
};

#[derive(Parser)]
#[command(name = "chatwire")]
#[command(author, version, about = "Chatwire - terminal WebSocket chat client")]
struct Cli {
    /// Path to configuration file (default: ~/.chatwire/config.toml)
    #[arg(short, long, env = "CHATWIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the chat
    Connect {
        /// Display name (default: configured identity or a guest name)
        #[arg(short, long)]
        name: Option<String>,

        /// Server to use instead of the configured list (repeatable)
        #[arg(short, long = "endpoint")]
        endpoints: Vec<String>,

        /// Report undecodable frames instead of dropping them
        #[arg(long)]
        strict: bool,

        /// Do not ring the terminal bell on new messages
        #[arg(long)]
        no_bell: bool,
    },
    /// Try each configured server once and report which are reachable
    Probe {
        /// Server to probe instead of the configured list (repeatable)
        #[arg(short, long = "endpoint")]
        endpoints: Vec<String>,
    },
    /// Write a default configuration file
    InitConfig {
        /// Destination (default: ~/.chatwire/config.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref())?;
    init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Connect {
            name,
            endpoints,
            strict,
            no_bell,
        } => {
            run_chat(config, name, endpoints, strict, !no_bell).await?;
        }
        Commands::Probe { endpoints } => {
            probe(config, endpoints).await?;
        }
        Commands::InitConfig { path, force } => {
            init_config(path, force)?;
        }
        Commands::Version => {
            show_version();
        }
    }

    Ok(())
}

async fn run_chat(
    mut config: Config,
    name: Option<String>,
    endpoints: Vec<String>,
    strict: bool,
    bell: bool,
) -> Result<()> {
    if !endpoints.is_empty() {
        config.endpoints.urls = endpoints;
    }
    if strict {
        config.protocol.mode = ParseMode::Strict;
    }
    config.validate()?;

    let identity = match name {
        Some(name) => SessionIdentity::new(name),
        None => config.session_identity(),
    };
    info!(identity = %identity.get(), mode = %config.protocol.mode, "Starting chat session");

    let (handle, mut events) = config.manager_builder(identity.clone())?.spawn();
    let mut view = TerminalView::stdout().with_bell(bell);

    println!(
        "{} Chatting as {}. Commands: /nick NAME, /users, /quit",
        "→".blue().bold(),
        identity.get().bold()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut outcome = Ok(());

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => {
                        if let Some(attempts) = render_event(&event, &identity, &mut view) {
                            outcome = Err(anyhow!("No chat server reachable after {} attempts", attempts));
                            break;
                        }
                    }
                    None => break,
                }
            }

            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match handle_input(&line, &handle, &mut view).await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => {
                            outcome = Err(e);
                            break;
                        }
                    },
                    Ok(None) => break,
                    Err(e) => {
                        outcome = Err(anyhow::Error::new(e).context("Failed to read stdin"));
                        break;
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    handle.shutdown().await;
    outcome
}

/// Act on one line of user input. Returns false when the user wants out.
async fn handle_input(
    line: &str,
    handle: &ChatHandle,
    view: &mut TerminalView<std::io::Stdout>,
) -> Result<bool> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line == "/nick" || line.starts_with("/nick ") {
        let name = line["/nick".len()..].trim();
        if name.is_empty() {
            println!("{}", "Usage: /nick NAME".yellow());
            return Ok(true);
        }
        report(handle.change_username(name).await, view)?;
        return Ok(true);
    }

    match line.trim() {
        "/quit" => return Ok(false),
        "/users" => {
            let shown = view.toggle_userlist();
            let state = if shown { "shown" } else { "hidden" };
            println!("{}", format!("User list {}", state).dimmed());
            return Ok(true);
        }
        _ => {}
    }

    report(handle.send_message(line).await.map(|_| ()), view)?;
    Ok(true)
}

/// Show recoverable send failures in the chat log; bubble up the rest
fn report<V: ChatView>(result: Result<(), ChatError>, view: &mut V) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(ChatError::NotConnected) => {
            view.append_bubble(&Bubble {
                kind: BubbleKind::Warning,
                author: "Warning".to_string(),
                text: "Not connected, nothing was sent".to_string(),
                timestamp: Utc::now(),
            });
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn probe(config: Config, endpoints: Vec<String>) -> Result<()> {
    let urls = if endpoints.is_empty() {
        config.endpoint_list()?.urls().to_vec()
    } else {
        endpoints
    };
    let connect_timeout = Duration::from_secs(config.connection.connect_timeout_secs);

    println!("{}", "Endpoints".bold());
    println!("{}", "─".repeat(60));

    let mut reachable = 0;
    for url in &urls {
        let started = Instant::now();

        match timeout(connect_timeout, connect_async(url.as_str())).await {
            Ok(Ok((mut ws, _))) => {
                reachable += 1;
                let latency = started.elapsed();
                let _ = ws.close(None).await;
                println!(
                    "  {:<40} {} {:>6} ms",
                    url,
                    "up".green(),
                    latency.as_millis()
                );
            }
            Ok(Err(e)) => {
                println!("  {:<40} {} {}", url, "down".red(), e.to_string().dimmed());
            }
            Err(_) => {
                println!("  {:<40} {} {}", url, "down".red(), "timeout".dimmed());
            }
        }
    }

    println!();
    println!("{}/{} endpoint(s) reachable", reachable, urls.len());

    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path().context("Could not determine home directory")?,
    };

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::default_config().save(&path)?;
    println!("{} Wrote {}", "✓".green().bold(), path.display());

    Ok(())
}

fn show_version() {
    println!("chatwire {}", env!("CARGO_PKG_VERSION"));
    println!("Terminal client for the chatwire WebSocket chat");
    println!();
    println!("Features:");
    println!("  - Round-robin failover across chat servers");
    println!("  - Reconnection with exponential backoff");
    println!("  - Strict or lenient frame decoding");
}
