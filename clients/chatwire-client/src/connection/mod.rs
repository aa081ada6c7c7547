//! Connection module
//!
//! This module handles all communication with the chat server, including
//! the WebSocket connection manager and the message protocol.

pub mod endpoints;
pub mod protocol;
pub mod retry;
pub mod state;
pub mod websocket;
