//! Chat flood
//!
//! Opens many chat clients at once. Each announces its local socket address
//! as its username, then posts an incrementing counter on a fixed interval.
//! Received frames and connected clients are reported every second.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use futures_util::{SinkExt, StreamExt};
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use chatwire_client::connection::protocol::{ChatPayload, Envelope};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
pub struct FloodStats {
    pub received: AtomicU64,
    pub connected: AtomicU64,
}

fn local_addr(ws: &WebSocketStream<MaybeTlsStream<TcpStream>>) -> String {
    match ws.get_ref() {
        MaybeTlsStream::Plain(stream) => stream
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string()),
        _ => "unknown".to_string(),
    }
}

/// One flooding client. Runs until the server goes away or shutdown is
/// signalled.
pub async fn run_client(
    url: String,
    every: Duration,
    stats: Arc<FloodStats>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    info!(url = %url, "Connecting");
    let ws = tokio::select! {
        result = timeout(CONNECT_TIMEOUT, connect_async(url.as_str())) => result??.0,
        _ = shutdown.changed() => {
            debug!(url = %url, "Shutdown while connecting");
            return Ok(());
        }
    };

    let username = local_addr(&ws);
    let (mut write, mut read) = ws.split();

    write
        .send(Message::Text(Envelope::username_change(&username).to_json()?))
        .await?;
    stats.connected.fetch_add(1, Ordering::Relaxed);

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;
    let mut counter: u64 = 0;

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                        stats.received.fetch_add(1, Ordering::Relaxed);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(username = %username, error = %e, "Read failed");
                        return Ok(());
                    }
                    None => return Ok(()),
                }
            }

            _ = ticker.tick() => {
                let envelope = Envelope::Message(ChatPayload {
                    author: String::new(),
                    message: counter.to_string(),
                    timestamp: Utc::now().timestamp() as f64,
                });
                if let Err(e) = write.send(Message::Text(envelope.to_json()?)).await {
                    warn!(username = %username, error = %e, "Write failed");
                    return Ok(());
                }
                counter += 1;
            }

            _ = shutdown.changed() => {
                debug!(username = %username, "Closing");
                write
                    .send(Message::Close(Some(CloseFrame {
                        code: CloseCode::Normal,
                        reason: Cow::Borrowed(""),
                    })))
                    .await?;

                // Give the server a moment to close its side.
                let _ = timeout(Duration::from_secs(1), async {
                    while let Some(Ok(msg)) = read.next().await {
                        if msg.is_close() {
                            break;
                        }
                    }
                })
                .await;
                return Ok(());
            }
        }
    }
}

/// Start `clients` flooding clients and report counters until Ctrl-C
pub async fn run(url: &str, clients: usize, every: Duration) -> Result<()> {
    let stats = Arc::new(FloodStats::default());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    println!(
        "{} Starting {} chat clients against {}",
        "→".blue().bold(),
        clients,
        url
    );

    let mut tasks = Vec::with_capacity(clients);
    for _ in 0..clients {
        let url = url.to_string();
        let stats = stats.clone();
        let shutdown = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = run_client(url, every, stats, shutdown).await {
                warn!(error = %e, "Client failed");
            }
        }));
    }

    let mut ticker = interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                println!(
                    "{} received, {} connected",
                    stats.received.load(Ordering::Relaxed),
                    stats.connected.load(Ordering::Relaxed)
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    for task in tasks {
        let _ = task.await;
    }

    println!(
        "{} {} frames received by {} clients",
        "✓".green().bold(),
        stats.received.load(Ordering::Relaxed),
        stats.connected.load(Ordering::Relaxed)
    );

    Ok(())
}
