//! WebSocket Connection Manager
//!
//! Owns the socket to the chat server. Picks endpoints round-robin, announces
//! the session identity on open, reports everything that happens as
//! [`ConnectionEvent`]s and reconnects according to a [`RetryPolicy`].

use chrono::Utc;
use futures_util::{Sink, SinkExt, StreamExt};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::chat::identity::SessionIdentity;
use crate::connection::endpoints::EndpointList;
use crate::connection::protocol::{Envelope, ParseMode};
use crate::connection::retry::RetryPolicy;
use crate::connection::state::{ConnectionState, ConnectionStateManager};
use crate::error::{ChatError, ProtocolError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Everything the connection manager reports to its consumer
#[derive(Debug)]
pub enum ConnectionEvent {
    /// An attempt to reach `endpoint` has started
    Connecting { endpoint: String, attempt: u32 },
    /// Socket is open and the username has been announced
    Open { endpoint: String },
    /// Attempt failed or an open socket went away
    Closed {
        endpoint: String,
        reason: Option<String>,
    },
    /// A decoded frame from the server
    Frame(Envelope),
    /// A frame that failed to decode (strict mode only)
    Rejected(ProtocolError),
    /// Retry policy exhausted; no further events follow
    GaveUp { attempts: u32 },
}

enum Command {
    Send(Envelope),
}

enum SessionEnd {
    /// Could not open or greet; counts against the retry policy
    Failed(String),
    /// Was open, then went away
    Closed(Option<String>),
    Shutdown,
}

/// Drives a single logical chat connection across reconnects
pub struct ConnectionManager {
    endpoints: EndpointList,
    retry: RetryPolicy,
    connect_timeout: Duration,
    parse_mode: ParseMode,
    identity: SessionIdentity,
    state: ConnectionStateManager,
    events: mpsc::Sender<ConnectionEvent>,
    commands: mpsc::Receiver<Command>,
    shutdown: watch::Receiver<bool>,
}

impl ConnectionManager {
    /// Run until shutdown is requested, every handle is dropped, or the
    /// retry policy gives up.
    pub async fn run(mut self) {
        let mut failures: u32 = 0;

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let endpoint = self.endpoints.next_endpoint().to_string();
            self.state.set_connecting(&endpoint);
            self.emit(ConnectionEvent::Connecting {
                endpoint: endpoint.clone(),
                attempt: self.state.connection_attempts(),
            })
            .await;

            let span = info_span!("connection", id = %Uuid::new_v4(), endpoint = %endpoint);
            let outcome = self.connect_and_run(&endpoint).instrument(span).await;

            let reason = match outcome {
                SessionEnd::Shutdown => break,
                SessionEnd::Failed(reason) => {
                    failures += 1;
                    warn!(endpoint = %endpoint, failures, reason = %reason, "Connection attempt failed");
                    Some(reason)
                }
                SessionEnd::Closed(reason) => {
                    failures = 0;
                    info!(endpoint = %endpoint, ?reason, "Connection closed");
                    reason
                }
            };

            self.state.set_disconnected(reason.clone());
            self.emit(ConnectionEvent::Closed { endpoint, reason }).await;

            if self.retry.is_exhausted(failures) {
                self.state.set_gave_up(failures);
                self.emit(ConnectionEvent::GaveUp { attempts: failures }).await;
                return;
            }

            self.state.set_reconnecting();

            let delay = self.retry.delay_for(failures.max(1));
            info!(
                delay_ms = delay.as_millis() as u64,
                next = %self.endpoints.peek(),
                "Waiting before reconnection attempt"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = wait_for_shutdown(&mut self.shutdown) => break,
            }
        }

        self.state.set_shutting_down();
    }

    /// Open a socket to `endpoint` and pump it until it ends
    async fn connect_and_run(&mut self, endpoint: &str) -> SessionEnd {
        info!("Connecting to chat server");

        let connect = timeout(self.connect_timeout, connect_async(endpoint));
        let ws_stream = tokio::select! {
            result = connect => match result {
                Ok(Ok((stream, _response))) => stream,
                Ok(Err(e)) => return SessionEnd::Failed(format!("Failed to connect: {}", e)),
                Err(_) => return SessionEnd::Failed("Connection timeout".to_string()),
            },
            _ = wait_for_shutdown(&mut self.shutdown) => return SessionEnd::Shutdown,
        };

        self.run_session(ws_stream).await
    }

    async fn run_session(&mut self, ws_stream: WsStream) -> SessionEnd {
        let (mut write, mut read) = ws_stream.split();

        // Anything queued while we were away is stale.
        while let Ok(Command::Send(envelope)) = self.commands.try_recv() {
            debug!(kind = envelope.kind(), "Discarding envelope queued while disconnected");
        }

        let hello = Envelope::username_change(&self.identity.get());
        if let Err(e) = send_envelope(&mut write, &hello).await {
            return SessionEnd::Failed(format!("Failed to announce username: {}", e));
        }
        debug!(username = %self.identity.get(), "Username announced");

        self.state.set_connected();
        self.emit(ConnectionEvent::Open {
            endpoint: self.state.endpoint().unwrap_or_default(),
        })
        .await;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.handle_frame(&text).await,
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            if let Err(e) = write.send(Message::Pong(data)).await {
                                return SessionEnd::Closed(Some(format!("WebSocket error: {}", e)));
                            }
                        }
                        Some(Ok(Message::Pong(_))) => {
                            debug!("Received pong");
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!(?frame, "Received close frame");
                            let reason = frame
                                .map(|f| f.reason.into_owned())
                                .filter(|r| !r.is_empty())
                                .unwrap_or_else(|| "Server closed connection".to_string());
                            return SessionEnd::Closed(Some(reason));
                        }
                        Some(Ok(Message::Binary(_))) => {
                            debug!("Received binary message (ignored)");
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            debug!(error = %e, "WebSocket error");
                            return SessionEnd::Closed(Some(format!("WebSocket error: {}", e)));
                        }
                        None => {
                            return SessionEnd::Closed(Some("Stream ended".to_string()));
                        }
                    }
                }

                command = self.commands.recv() => {
                    match command {
                        Some(Command::Send(envelope)) => {
                            if let Err(e) = send_envelope(&mut write, &envelope).await {
                                return SessionEnd::Closed(Some(format!("WebSocket error: {}", e)));
                            }
                            debug!(kind = envelope.kind(), "Envelope sent");
                        }
                        None => {
                            debug!("All handles dropped, closing");
                            close_normally(&mut write).await;
                            return SessionEnd::Shutdown;
                        }
                    }
                }

                _ = wait_for_shutdown(&mut self.shutdown) => {
                    close_normally(&mut write).await;
                    return SessionEnd::Shutdown;
                }
            }
        }
    }

    async fn handle_frame(&self, text: &str) {
        match self.parse_mode.decode(text) {
            Ok(Some(envelope)) => self.emit(ConnectionEvent::Frame(envelope)).await,
            Ok(None) => {}
            Err(e) => self.emit(ConnectionEvent::Rejected(e)).await,
        }
    }

    async fn emit(&self, event: ConnectionEvent) {
        if self.events.send(event).await.is_err() {
            debug!("Event receiver dropped");
        }
    }
}

async fn send_envelope<S>(write: &mut S, envelope: &Envelope) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let json = envelope.to_json()?;
    write.send(Message::Text(json)).await?;
    Ok(())
}

async fn close_normally<S>(write: &mut S)
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: Cow::Borrowed(""),
    };

    if let Err(e) = write.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "Failed to send close frame");
    }
}

/// Resolves once shutdown is requested or the requesting side is gone
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Cloneable handle for talking to a running [`ConnectionManager`]
#[derive(Clone)]
pub struct ChatHandle {
    commands: mpsc::Sender<Command>,
    shutdown: Arc<watch::Sender<bool>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
    state: ConnectionStateManager,
    identity: SessionIdentity,
}

impl ChatHandle {
    /// Queue an envelope for the open socket
    pub async fn send(&self, envelope: Envelope) -> Result<()> {
        if self.state.is_terminal() {
            return Err(ChatError::Stopped);
        }
        if !self.state.is_connected() {
            return Err(ChatError::NotConnected);
        }

        self.commands
            .send(Command::Send(envelope))
            .await
            .map_err(|_| ChatError::Stopped)
    }

    /// Send `text` as a chat line from the current identity.
    ///
    /// Returns `Ok(false)` without sending anything when the text or the
    /// identity is empty.
    pub async fn send_message(&self, text: &str) -> Result<bool> {
        let author = self.identity.get();
        let Some(envelope) = Envelope::chat_message(&author, text, Utc::now()) else {
            return Ok(false);
        };

        self.send(envelope).await?;
        Ok(true)
    }

    /// Change the session identity and tell the server if we are connected.
    ///
    /// When disconnected the new name is announced on the next open.
    pub async fn change_username(&self, name: &str) -> Result<()> {
        self.identity.set(name);

        match self.send(Envelope::username_change(name)).await {
            Err(ChatError::NotConnected) => {
                debug!(username = %name, "Not connected, username will be announced on open");
                Ok(())
            }
            other => other,
        }
    }

    /// Stop reconnecting, close the socket and wait for the manager to exit
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Connection manager task failed");
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.current_state()
    }

    pub fn state_manager(&self) -> &ConnectionStateManager {
        &self.state
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }
}

/// Builder for [`ConnectionManager`]
pub struct ConnectionManagerBuilder {
    endpoints: EndpointList,
    retry: RetryPolicy,
    connect_timeout: Duration,
    parse_mode: ParseMode,
    event_buffer: usize,
    identity: SessionIdentity,
}

impl ConnectionManagerBuilder {
    pub fn new(identity: SessionIdentity) -> Self {
        Self {
            endpoints: EndpointList::default(),
            retry: RetryPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            parse_mode: ParseMode::default(),
            event_buffer: 256,
            identity,
        }
    }

    pub fn endpoints(mut self, endpoints: EndpointList) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn event_buffer(mut self, event_buffer: usize) -> Self {
        self.event_buffer = event_buffer.max(1);
        self
    }

    /// Build the manager without starting it. Drive it with
    /// [`ConnectionManager::run`].
    pub fn build(self) -> (ConnectionManager, ChatHandle, mpsc::Receiver<ConnectionEvent>) {
        let (event_tx, event_rx) = mpsc::channel(self.event_buffer);
        let (command_tx, command_rx) = mpsc::channel(self.event_buffer);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = ConnectionStateManager::new();

        let manager = ConnectionManager {
            endpoints: self.endpoints,
            retry: self.retry,
            connect_timeout: self.connect_timeout,
            parse_mode: self.parse_mode,
            identity: self.identity.clone(),
            state: state.clone(),
            events: event_tx,
            commands: command_rx,
            shutdown: shutdown_rx,
        };

        let handle = ChatHandle {
            commands: command_tx,
            shutdown: Arc::new(shutdown_tx),
            task: Arc::new(Mutex::new(None)),
            state,
            identity: self.identity,
        };

        (manager, handle, event_rx)
    }

    /// Build the manager and run it on the tokio runtime
    pub fn spawn(self) -> (ChatHandle, mpsc::Receiver<ConnectionEvent>) {
        let (manager, handle, events) = self.build();
        let task = tokio::spawn(manager.run());
        *handle.task.lock() = Some(task);
        (handle, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    async fn next_event(events: &mut mpsc::Receiver<ConnectionEvent>) -> ConnectionEvent {
        timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("event in time")
            .expect("event channel open")
    }

    async fn wait_for_open(events: &mut mpsc::Receiver<ConnectionEvent>) -> String {
        loop {
            if let ConnectionEvent::Open { endpoint } = next_event(events).await {
                return endpoint;
            }
        }
    }

    async fn live_server() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    async fn dead_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        drop(listener);
        url
    }

    async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
        let (stream, _) = listener.accept().await.unwrap();
        accept_async(stream).await.unwrap()
    }

    async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
        loop {
            let msg = timeout(Duration::from_secs(5), ws.next())
                .await
                .expect("frame in time")
                .expect("stream open")
                .expect("valid frame");
            if let Message::Text(text) = msg {
                return text;
            }
        }
    }

    fn fast_retry(max_attempts: Option<u32>) -> RetryPolicy {
        RetryPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            multiplier: 2,
            jitter: 0.1,
            max_attempts,
        }
    }

    fn builder(name: &str, urls: Vec<String>) -> ConnectionManagerBuilder {
        ConnectionManagerBuilder::new(SessionIdentity::new(name))
            .endpoints(EndpointList::new(urls).unwrap())
            .retry_policy(fast_retry(None))
            .connect_timeout(Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_announces_username_on_open() {
        let (listener, url) = live_server().await;
        let (handle, mut events) = builder("alice", vec![url.clone()]).spawn();

        let mut server = accept(&listener).await;
        let hello = Envelope::from_json(&next_text(&mut server).await).unwrap();
        assert_eq!(hello, Envelope::username_change("alice"));

        match next_event(&mut events).await {
            ConnectionEvent::Connecting { endpoint, attempt } => {
                assert_eq!(endpoint, url);
                assert_eq!(attempt, 1);
            }
            other => panic!("Expected Connecting, got {:?}", other),
        }
        assert_eq!(wait_for_open(&mut events).await, url);
        assert_eq!(handle.state(), ConnectionState::Connected);

        handle.shutdown().await;
        assert_eq!(handle.state(), ConnectionState::ShuttingDown);
    }

    #[tokio::test]
    async fn test_frames_become_events_and_bad_frames_are_dropped() {
        let (listener, url) = live_server().await;
        let (handle, mut events) = builder("alice", vec![url]).spawn();

        let mut server = accept(&listener).await;
        next_text(&mut server).await;
        wait_for_open(&mut events).await;

        for frame in [
            r#"{"Type":"Userlist","Username":["alice","bob"]}"#,
            "this is not json",
            r#"{"Type":"Typing","Username":"bob"}"#,
            r#"{"Type":"Message","Author":"bob","Message":"hi","Timestamp":1}"#,
        ] {
            server.send(Message::Text(frame.to_string())).await.unwrap();
        }

        match next_event(&mut events).await {
            ConnectionEvent::Frame(Envelope::Userlist(payload)) => {
                assert_eq!(payload.username, vec!["alice", "bob"]);
            }
            other => panic!("Expected Userlist frame, got {:?}", other),
        }
        match next_event(&mut events).await {
            ConnectionEvent::Frame(Envelope::Message(payload)) => assert_eq!(payload.author, "bob"),
            other => panic!("Expected Message frame, got {:?}", other),
        }

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_strict_mode_reports_rejected_frames() {
        let (listener, url) = live_server().await;
        let (handle, mut events) = builder("alice", vec![url])
            .parse_mode(ParseMode::Strict)
            .spawn();

        let mut server = accept(&listener).await;
        next_text(&mut server).await;
        wait_for_open(&mut events).await;

        server.send(Message::Text("{broken".to_string())).await.unwrap();

        match next_event(&mut events).await {
            ConnectionEvent::Rejected(ProtocolError::Malformed(_)) => {}
            other => panic!("Expected Rejected, got {:?}", other),
        }
        assert!(handle.state_manager().is_connected());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_send_message_reaches_server() {
        let (listener, url) = live_server().await;
        let (handle, mut events) = builder("alice", vec![url]).spawn();

        let mut server = accept(&listener).await;
        next_text(&mut server).await;
        wait_for_open(&mut events).await;

        let before = Utc::now().timestamp();
        assert!(handle.send_message("hello").await.unwrap());
        assert!(!handle.send_message("").await.unwrap());

        match Envelope::from_json(&next_text(&mut server).await).unwrap() {
            Envelope::Message(payload) => {
                assert_eq!(payload.author, "alice");
                assert_eq!(payload.message, "hello");
                assert!((payload.timestamp - before as f64).abs() <= 1.0);
            }
            other => panic!("Expected Message, got {:?}", other),
        }

        handle.change_username("alicia").await.unwrap();
        assert_eq!(
            Envelope::from_json(&next_text(&mut server).await).unwrap(),
            Envelope::username_change("alicia")
        );

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let url = dead_endpoint().await;
        let (handle, mut events) = builder("alice", vec![url])
            .retry_policy(fast_retry(Some(2)))
            .spawn();

        let mut connecting = 0;
        let attempts = loop {
            match next_event(&mut events).await {
                ConnectionEvent::Connecting { .. } => connecting += 1,
                ConnectionEvent::GaveUp { attempts } => break attempts,
                ConnectionEvent::Closed { reason, .. } => assert!(reason.is_some()),
                other => panic!("Unexpected event {:?}", other),
            }
        };

        assert_eq!(attempts, 2);
        assert_eq!(connecting, 2);
        assert_eq!(handle.state(), ConnectionState::GaveUp);
        assert!(matches!(
            handle.send_message("hello").await,
            Err(ChatError::Stopped)
        ));

        handle.shutdown().await;
        assert_eq!(handle.state(), ConnectionState::GaveUp);
    }

    #[tokio::test]
    async fn test_send_while_disconnected_is_an_error() {
        let url = dead_endpoint().await;
        let (handle, _events) = builder("alice", vec![url])
            .retry_policy(RetryPolicy {
                initial_delay: Duration::from_secs(60),
                max_delay: Duration::from_secs(60),
                multiplier: 1,
                jitter: 0.1,
                max_attempts: None,
            })
            .spawn();

        assert!(matches!(
            handle.send_message("hello").await,
            Err(ChatError::NotConnected)
        ));

        handle.change_username("bob").await.unwrap();
        assert_eq!(handle.identity().get(), "bob");

        handle.shutdown().await;
        assert_eq!(handle.state(), ConnectionState::ShuttingDown);
    }

    #[tokio::test]
    async fn test_round_robin_across_reconnects() {
        let dead = dead_endpoint().await;
        let (listener, live) = live_server().await;
        let (handle, mut events) = builder("alice", vec![dead.clone(), live.clone()]).spawn();

        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            next_text(&mut ws).await;
            ws
        });

        let mut tried = Vec::new();
        loop {
            match next_event(&mut events).await {
                ConnectionEvent::Connecting { endpoint, .. } => tried.push(endpoint),
                ConnectionEvent::Open { endpoint } => {
                    assert_eq!(endpoint, live);
                    break;
                }
                _ => {}
            }
        }
        assert_eq!(tried, vec![dead, live]);

        let _ws = server.await.unwrap();
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_reconnects_after_server_closes() {
        let (listener, url) = live_server().await;
        let (handle, mut events) = builder("alice", vec![url]).spawn();

        let mut first = accept(&listener).await;
        next_text(&mut first).await;
        wait_for_open(&mut events).await;
        first.close(None).await.unwrap();

        let mut second = accept(&listener).await;
        assert_eq!(
            Envelope::from_json(&next_text(&mut second).await).unwrap(),
            Envelope::username_change("alice")
        );

        let mut saw_closed = false;
        loop {
            match next_event(&mut events).await {
                ConnectionEvent::Closed { .. } => saw_closed = true,
                ConnectionEvent::Open { .. } => break,
                _ => {}
            }
        }
        assert!(saw_closed);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_closed_sessions_do_not_count_towards_giving_up() {
        let (listener, url) = live_server().await;
        let (handle, mut events) = builder("alice", vec![url])
            .retry_policy(fast_retry(Some(1)))
            .spawn();

        for _ in 0..2 {
            let mut server = accept(&listener).await;
            next_text(&mut server).await;
            wait_for_open(&mut events).await;
            server.close(None).await.unwrap();

            loop {
                match next_event(&mut events).await {
                    ConnectionEvent::Closed { .. } => break,
                    ConnectionEvent::GaveUp { attempts } => {
                        panic!("Gave up after {} attempts", attempts)
                    }
                    _ => {}
                }
            }
        }

        let mut third = accept(&listener).await;
        next_text(&mut third).await;
        loop {
            match next_event(&mut events).await {
                ConnectionEvent::Open { .. } => break,
                ConnectionEvent::GaveUp { attempts } => panic!("Gave up after {} attempts", attempts),
                _ => {}
            }
        }

        assert!(!handle.state_manager().is_terminal());
        assert_eq!(handle.state(), ConnectionState::Connected);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_sends_normal_close() {
        let (listener, url) = live_server().await;
        let (handle, mut events) = builder("alice", vec![url]).spawn();

        let mut server = accept(&listener).await;
        next_text(&mut server).await;
        wait_for_open(&mut events).await;

        handle.shutdown().await;

        let msg = timeout(Duration::from_secs(5), server.next())
            .await
            .expect("close in time")
            .expect("stream open")
            .expect("valid frame");
        match msg {
            Message::Close(Some(frame)) => assert_eq!(frame.code, CloseCode::Normal),
            other => panic!("Expected close frame, got {:?}", other),
        }
    }
}
