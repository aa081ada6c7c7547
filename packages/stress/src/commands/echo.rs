//! Echo round-trip test
//!
//! Connects to a server that loops every frame back, sends a fixed set of
//! text and binary packets, checks that each comes back unchanged and in
//! order, then closes normally. Many workers repeat this forever.

use anyhow::Result;
use colored::Colorize;
use futures_util::{SinkExt, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use rand::RngCore;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{info, warn};

const LOREM: &str = "Lorem ipsum dolor sit amet, consetetur sadipscing elitr, sed diam nonumy eirmod tempor invidunt ut labore et dolore magna aliquyam erat, sed diam voluptua. At vero eos et accusam et justo duo dolores et ea rebum. Stet clita kasd gubergren, no sea takimata sanctus est Lorem ipsum dolor sit amet. Lorem ipsum dolor sit amet, consetetur sadipscing elitr, sed diam nonumy eirmod tempor invidunt ut labore et dolore magna aliquyam erat, sed diam voluptua. At vero eos et accusam et justo duo dolores et ea rebum. Stet clita kasd gubergren, no sea takimata sanctus est Lorem ipsum dolor sit amet.";

#[derive(Debug, Error)]
pub enum EchoError {
    #[error("failed to connect: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("received more packets than expected")]
    UnexpectedPacket,

    #[error("packet {index}: unexpected packet type")]
    WrongType { index: usize },

    #[error("packet {index}: unexpected packet payload")]
    WrongPayload { index: usize },

    #[error("connection closed before all packets came back")]
    ClosedEarly,

    #[error("receive timeout, not all packets were received in time")]
    ReceiveTimeout,

    #[error("closure timeout")]
    CloseTimeout,
}

/// One connection test: where to connect and what to send
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub url: String,
    pub packets: Vec<Message>,
    pub receive_timeout: Duration,
    pub close_timeout: Duration,
}

/// Latencies measured by a single connection test
#[derive(Debug, Clone, Default)]
pub struct TestResult {
    pub total_duration: Duration,
    /// Time to complete the WebSocket handshake
    pub connect_latency: Duration,
    /// From handshake done until the first packet came back
    pub first_roundtrip_latency: Duration,
    /// From handshake done until every packet came back
    pub full_roundtrip_latency: Duration,
    /// From sending the close frame until the server closed
    pub disconnect_latency: Duration,
}

impl TestOptions {
    /// The standard packet set: short and long text, a single byte, 4 KiB of
    /// random bytes, several tiny text frames and a long binary frame
    pub fn standard(url: impl Into<String>) -> Self {
        let mut random = vec![0u8; 4096];
        rand::thread_rng().fill_bytes(&mut random);

        let mut packets = vec![
            Message::Text("Test".to_string()),
            Message::Text(LOREM.to_string()),
            Message::Binary(vec![123]),
            Message::Binary(random),
        ];
        packets.extend(
            ["1", "2", "3", "4", "5", "12"]
                .into_iter()
                .map(|s| Message::Text(s.to_string())),
        );
        packets.push(Message::Binary(LOREM.as_bytes().to_vec()));

        Self {
            url: url.into(),
            packets,
            receive_timeout: Duration::from_secs(5),
            close_timeout: Duration::from_secs(5),
        }
    }
}

/// Compare an echoed frame with the one we sent
pub fn check_packet(index: usize, expected: &Message, received: &Message) -> Result<(), EchoError> {
    let same_type = matches!(
        (expected, received),
        (Message::Text(_), Message::Text(_)) | (Message::Binary(_), Message::Binary(_))
    );
    if !same_type {
        return Err(EchoError::WrongType { index });
    }

    if expected.clone().into_data() != received.clone().into_data() {
        return Err(EchoError::WrongPayload { index });
    }

    Ok(())
}

/// Run one connect / echo / close cycle against `opt.url`
pub async fn do_connection_test(opt: &TestOptions) -> Result<TestResult, EchoError> {
    let start = Instant::now();
    let mut res = TestResult::default();

    let (ws, _) = connect_async(opt.url.as_str())
        .await
        .map_err(EchoError::Connect)?;
    res.connect_latency = start.elapsed();
    let connected_at = Instant::now();

    let (mut write, mut read) = ws.split();

    let sender = async {
        for packet in &opt.packets {
            write.send(packet.clone()).await?;
        }
        Ok::<_, EchoError>(())
    };

    let receiver = async {
        let mut first = None;
        for (index, expected) in opt.packets.iter().enumerate() {
            let received = loop {
                match read.next().await {
                    Some(Ok(msg @ (Message::Text(_) | Message::Binary(_)))) => break msg,
                    Some(Ok(Message::Close(_))) | None => return Err(EchoError::ClosedEarly),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                }
            };

            check_packet(index, expected, &received)?;

            if index == 0 {
                first = Some(connected_at.elapsed());
            }
        }
        Ok::<_, EchoError>((first.unwrap_or_default(), connected_at.elapsed()))
    };
    let receiver = async {
        timeout(opt.receive_timeout, receiver)
            .await
            .map_err(|_| EchoError::ReceiveTimeout)?
    };

    let (sent, received) = tokio::join!(sender, receiver);
    sent?;
    let (first, full) = received?;
    res.first_roundtrip_latency = first;
    res.full_roundtrip_latency = full;

    let closing_at = Instant::now();
    write
        .send(Message::Close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: Cow::Borrowed(""),
        })))
        .await?;

    let closed = async {
        loop {
            match read.next().await {
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                    return Err(EchoError::UnexpectedPacket)
                }
                Some(Ok(_)) => continue,
                Some(Err(tungstenite::Error::ConnectionClosed)) => return Ok(()),
                Some(Err(e)) => return Err(EchoError::Transport(e)),
            }
        }
    };
    timeout(opt.close_timeout, closed)
        .await
        .map_err(|_| EchoError::CloseTimeout)??;

    res.disconnect_latency = closing_at.elapsed();
    res.total_duration = start.elapsed();

    Ok(res)
}

#[derive(Default)]
struct EchoStats {
    succeeded: AtomicU64,
    failed: AtomicU64,
    roundtrip_micros: AtomicU64,
}

/// Hammer the echo server with `workers` looping connection tests
pub async fn run(url: &str, workers: usize) -> Result<()> {
    let options = Arc::new(TestOptions::standard(url));
    let stats = Arc::new(EchoStats::default());

    println!(
        "{} Running {} echo workers against {}",
        "→".blue().bold(),
        workers,
        url
    );

    for worker in 0..workers {
        let options = options.clone();
        let stats = stats.clone();
        tokio::spawn(async move {
            loop {
                match do_connection_test(&options).await {
                    Ok(res) => {
                        stats.succeeded.fetch_add(1, Ordering::Relaxed);
                        stats
                            .roundtrip_micros
                            .fetch_add(res.full_roundtrip_latency.as_micros() as u64, Ordering::Relaxed);
                        info!(
                            worker,
                            connect_ms = res.connect_latency.as_millis() as u64,
                            first_roundtrip_ms = res.first_roundtrip_latency.as_millis() as u64,
                            full_roundtrip_ms = res.full_roundtrip_latency.as_millis() as u64,
                            disconnect_ms = res.disconnect_latency.as_millis() as u64,
                            total_ms = res.total_duration.as_millis() as u64,
                            "Connection test passed"
                        );
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                    Err(e) => {
                        stats.failed.fetch_add(1, Ordering::Relaxed);
                        warn!(worker, error = %e, "Connection test failed");
                        tokio::time::sleep(Duration::from_secs(3)).await;
                    }
                }
            }
        });
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")?,
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                spinner.set_message(summary(&stats));
                spinner.tick();
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    spinner.finish_with_message(format!("{} {}", "✓".green().bold(), summary(&stats)));
    Ok(())
}

fn summary(stats: &EchoStats) -> String {
    let ok = stats.succeeded.load(Ordering::Relaxed);
    let failed = stats.failed.load(Ordering::Relaxed);
    let avg_ms = if ok > 0 {
        stats.roundtrip_micros.load(Ordering::Relaxed) as f64 / ok as f64 / 1000.0
    } else {
        0.0
    };

    format!(
        "{} passed, {} failed, avg full round-trip {:.1} ms",
        ok.to_string().green(),
        failed.to_string().red(),
        avg_ms
    )
}
