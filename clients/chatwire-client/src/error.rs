//! Error Types
//!
//! Typed errors surfaced by the client library. The binaries wrap these in
//! `anyhow` at their edges.

use thiserror::Error;

/// Failure to turn a text frame into an [`Envelope`](crate::Envelope)
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame is not valid JSON
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Frame is JSON but has no string `Type` field
    #[error("frame has no `Type` tag")]
    MissingType,

    /// `Type` tag is not one this client understands
    #[error("unknown envelope type `{0}`")]
    UnknownType(String),

    /// Known `Type` but the fields do not match its shape
    #[error("invalid `{kind}` envelope: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors returned by [`ChatHandle`](crate::ChatHandle)
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("not connected to a chat server")]
    NotConnected,

    #[error("connection manager has stopped")]
    Stopped,

    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;
