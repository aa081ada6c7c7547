//! Connection State Management
//!
//! Provides the connection state machine and a thread-safe state manager
//! shared between the connection manager task and its handles.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

const MAX_TRANSITIONS: usize = 100;

/// Represents the possible states of the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket open and no attempt in flight
    Disconnected,
    /// Opening a socket to an endpoint
    Connecting,
    /// Socket open, username announced
    Connected,
    /// Waiting out the backoff delay before the next attempt
    Reconnecting,
    /// Retry policy exhausted; terminal
    GaveUp,
    /// Shutdown requested; terminal
    ShuttingDown,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Reconnecting => write!(f, "Reconnecting"),
            ConnectionState::GaveUp => write!(f, "GaveUp"),
            ConnectionState::ShuttingDown => write!(f, "ShuttingDown"),
        }
    }
}

/// State transition information
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: ConnectionState,
    pub to: ConnectionState,
    pub timestamp: DateTime<Utc>,
    pub reason: Option<String>,
}

struct StateInner {
    current: ConnectionState,
    endpoint: Option<String>,
    last_connected: Option<DateTime<Utc>>,
    connection_attempts: u32,
    transitions: Vec<StateTransition>,
}

/// Thread-safe connection state manager
#[derive(Clone)]
pub struct ConnectionStateManager {
    inner: Arc<RwLock<StateInner>>,
}

impl ConnectionStateManager {
    /// Create a new state manager starting in Disconnected state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StateInner {
                current: ConnectionState::Disconnected,
                endpoint: None,
                last_connected: None,
                connection_attempts: 0,
                transitions: Vec::new(),
            })),
        }
    }

    pub fn current_state(&self) -> ConnectionState {
        self.inner.read().current
    }

    /// Endpoint of the current or most recent attempt
    pub fn endpoint(&self) -> Option<String> {
        self.inner.read().endpoint.clone()
    }

    pub fn last_connected(&self) -> Option<DateTime<Utc>> {
        self.inner.read().last_connected
    }

    /// Attempts since the last successful connection
    pub fn connection_attempts(&self) -> u32 {
        self.inner.read().connection_attempts
    }

    /// Transition to a new state, returning false if the move is not allowed
    pub fn transition_to(&self, new_state: ConnectionState, reason: Option<String>) -> bool {
        let mut inner = self.inner.write();

        if !Self::is_valid_transition(inner.current, new_state) {
            tracing::debug!(
                from = %inner.current,
                to = %new_state,
                "Rejected connection state transition"
            );
            return false;
        }

        let old_state = inner.current;
        inner.current = new_state;

        match new_state {
            ConnectionState::Connected => {
                inner.last_connected = Some(Utc::now());
                inner.connection_attempts = 0;
            }
            ConnectionState::Connecting => {
                inner.connection_attempts += 1;
            }
            _ => {}
        }

        inner.transitions.push(StateTransition {
            from: old_state,
            to: new_state,
            timestamp: Utc::now(),
            reason,
        });

        if inner.transitions.len() > MAX_TRANSITIONS {
            inner.transitions.remove(0);
        }

        tracing::info!(
            from = %old_state,
            to = %new_state,
            attempts = inner.connection_attempts,
            "Connection state transition"
        );

        true
    }

    fn is_valid_transition(from: ConnectionState, to: ConnectionState) -> bool {
        use ConnectionState::*;

        if from == to {
            return !matches!(from, GaveUp | ShuttingDown);
        }

        matches!(
            (from, to),
            (Disconnected, Connecting)
                | (Disconnected, Reconnecting)
                | (Disconnected, GaveUp)
                | (Disconnected, ShuttingDown)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connecting, ShuttingDown)
                | (Connected, Disconnected)
                | (Connected, ShuttingDown)
                | (Reconnecting, Connecting)
                | (Reconnecting, GaveUp)
                | (Reconnecting, ShuttingDown)
        )
    }

    /// Set state to connecting to `endpoint`
    pub fn set_connecting(&self, endpoint: &str) {
        self.inner.write().endpoint = Some(endpoint.to_string());
        self.transition_to(
            ConnectionState::Connecting,
            Some(format!("Trying to connect to \"{}\"", endpoint)),
        );
    }

    pub fn set_connected(&self) {
        self.transition_to(ConnectionState::Connected, Some("Connection established".to_string()));
    }

    pub fn set_disconnected(&self, reason: Option<String>) {
        self.transition_to(ConnectionState::Disconnected, reason);
    }

    pub fn set_reconnecting(&self) {
        self.transition_to(
            ConnectionState::Reconnecting,
            Some("Connection lost, reconnecting".to_string()),
        );
    }

    pub fn set_gave_up(&self, attempts: u32) {
        self.transition_to(
            ConnectionState::GaveUp,
            Some(format!("Giving up after {} attempts", attempts)),
        );
    }

    pub fn set_shutting_down(&self) {
        self.transition_to(ConnectionState::ShuttingDown, Some("Shutdown requested".to_string()));
    }

    /// Most recent transitions, newest first
    pub fn recent_transitions(&self, count: usize) -> Vec<StateTransition> {
        let inner = self.inner.read();
        inner.transitions.iter().rev().take(count).cloned().collect()
    }

    pub fn is_connected(&self) -> bool {
        self.current_state() == ConnectionState::Connected
    }

    /// Whether the manager has stopped for good
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.current_state(),
            ConnectionState::GaveUp | ConnectionState::ShuttingDown
        )
    }
}

impl Default for ConnectionStateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let manager = ConnectionStateManager::new();
        assert_eq!(manager.current_state(), ConnectionState::Disconnected);
        assert!(manager.endpoint().is_none());
    }

    #[test]
    fn test_reconnect_cycle() {
        let manager = ConnectionStateManager::new();

        manager.set_connecting("ws://a:1");
        assert_eq!(manager.current_state(), ConnectionState::Connecting);
        assert_eq!(manager.endpoint().as_deref(), Some("ws://a:1"));

        manager.set_connected();
        assert!(manager.is_connected());
        assert!(manager.last_connected().is_some());

        manager.set_disconnected(Some("closed by peer".to_string()));
        manager.set_reconnecting();
        assert_eq!(manager.current_state(), ConnectionState::Reconnecting);

        manager.set_connecting("ws://b:2");
        assert_eq!(manager.current_state(), ConnectionState::Connecting);
        assert_eq!(manager.endpoint().as_deref(), Some("ws://b:2"));
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let manager = ConnectionStateManager::new();

        assert!(!manager.transition_to(ConnectionState::Connected, None));
        assert_eq!(manager.current_state(), ConnectionState::Disconnected);

        manager.set_connecting("ws://a:1");
        manager.set_disconnected(None);
        manager.set_reconnecting();
        manager.set_gave_up(3);
        assert!(manager.is_terminal());
        assert!(!manager.transition_to(ConnectionState::Connecting, None));
        assert!(!manager.transition_to(ConnectionState::GaveUp, None));
    }

    #[test]
    fn test_connection_attempts() {
        let manager = ConnectionStateManager::new();

        manager.set_connecting("ws://a:1");
        assert_eq!(manager.connection_attempts(), 1);

        manager.set_disconnected(None);
        manager.set_reconnecting();
        manager.set_connecting("ws://b:2");
        assert_eq!(manager.connection_attempts(), 2);

        manager.set_connected();
        assert_eq!(manager.connection_attempts(), 0);
    }

    #[test]
    fn test_transition_history() {
        let manager = ConnectionStateManager::new();

        manager.set_connecting("ws://a:1");
        manager.set_connected();

        let recent = manager.recent_transitions(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].to, ConnectionState::Connected);
        assert_eq!(recent[1].from, ConnectionState::Disconnected);
        assert_eq!(
            recent[1].reason.as_deref(),
            Some("Trying to connect to \"ws://a:1\"")
        );
    }
}
