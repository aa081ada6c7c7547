//! Chatwire Client Library
//!
//! This crate provides a WebSocket chat client: a reconnecting connection
//! manager, the JSON envelope protocol, and a dispatcher that turns incoming
//! envelopes into render instructions for a pluggable view.

pub mod chat;
pub mod cli;
pub mod connection;
pub mod error;

// Re-exports for convenience
pub use chat::dispatch::{dispatch, Banner, Bubble, BubbleKind, RenderInstruction};
pub use chat::identity::SessionIdentity;
pub use chat::view::{ChatLog, ChatView, TerminalView};
pub use cli::config::Config;
pub use connection::endpoints::EndpointList;
pub use connection::protocol::{Envelope, ParseMode};
pub use connection::retry::RetryPolicy;
pub use connection::state::{ConnectionState, ConnectionStateManager};
pub use connection::websocket::{ChatHandle, ConnectionEvent, ConnectionManager, ConnectionManagerBuilder};
pub use error::{ChatError, ProtocolError};
