//! Message Protocol
//!
//! Defines the JSON envelopes exchanged with the chat server. Every frame is
//! a JSON object tagged by its `Type` field:
//!
//! ```text
//! { "Type": "Username_Change", "Username": "alice" }
//! { "Type": "Message", "Author": "alice", "Message": "hi", "Timestamp": 1700000000 }
//! { "Type": "Userlist", "Username": ["alice", "bob"] }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::error::ProtocolError;

/// `Type` tags understood by this client
pub const ENVELOPE_TYPES: [&str; 5] = ["Message", "Info", "Error", "Username_Change", "Userlist"];

/// A single chat protocol message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum Envelope {
    /// Chat line written by a user
    Message(ChatPayload),

    /// Informational notice from the server
    Info(ChatPayload),

    /// Error notice from the server
    Error(ChatPayload),

    /// Announces the sender's display name
    #[serde(rename = "Username_Change")]
    UsernameChange(UsernameChangePayload),

    /// Full list of users currently connected
    Userlist(UserlistPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChatPayload {
    /// Missing or null on frames from clients that never set a name
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    /// Seconds since the Unix epoch. Peers may send fractions.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        serialize_with = "whole_seconds"
    )]
    pub timestamp: f64,
}

impl ChatPayload {
    /// `timestamp` in whole milliseconds, saturating at the `i64` range
    pub fn timestamp_millis(&self) -> i64 {
        // `as` saturates and maps NaN to zero
        (self.timestamp * 1000.0) as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UsernameChangePayload {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserlistPayload {
    /// Servers serialize an empty list as `null`
    #[serde(default, deserialize_with = "usernames")]
    pub username: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep every usable entry: strings as sent, other scalars in their JSON
/// form. Nulls, arrays and objects are skipped.
fn usernames<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(name) => Some(name),
            Value::Number(_) | Value::Bool(_) => Some(entry.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        })
        .collect())
}

/// Write whole seconds as a JSON integer, anything else as a float
fn whole_seconds<S>(seconds: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if seconds.fract() == 0.0 && seconds.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*seconds as i64)
    } else {
        serializer.serialize_f64(*seconds)
    }
}

impl Envelope {
    /// Build an outbound chat line stamped with `at` in whole seconds.
    ///
    /// Returns `None` when either the author or the text is empty; nothing
    /// should be sent in that case.
    pub fn chat_message(author: &str, text: &str, at: DateTime<Utc>) -> Option<Self> {
        if author.is_empty() || text.is_empty() {
            return None;
        }

        Some(Envelope::Message(ChatPayload {
            author: author.to_string(),
            message: text.to_string(),
            timestamp: at.timestamp() as f64,
        }))
    }

    /// Build a username announcement
    pub fn username_change(username: &str) -> Self {
        Envelope::UsernameChange(UsernameChangePayload {
            username: username.to_string(),
        })
    }

    /// The wire `Type` tag of this envelope
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Message(_) => "Message",
            Envelope::Info(_) => "Info",
            Envelope::Error(_) => "Error",
            Envelope::UsernameChange(_) => "Username_Change",
            Envelope::Userlist(_) => "Userlist",
        }
    }

    /// Serialize the envelope to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse and validate a text frame.
    ///
    /// Distinguishes frames that are not JSON, JSON without a `Type`, an
    /// unrecognised `Type`, and a recognised `Type` with the wrong fields.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;

        let kind = value
            .get("Type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?
            .to_string();

        if !ENVELOPE_TYPES.contains(&kind.as_str()) {
            return Err(ProtocolError::UnknownType(kind));
        }

        serde_json::from_value(value).map_err(|source| ProtocolError::InvalidPayload { kind, source })
    }
}

/// How frames that fail to decode are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Drop bad frames after logging them
    #[default]
    Lenient,
    /// Hand decode failures back to the caller
    Strict,
}

impl ParseMode {
    /// Decode a frame according to this mode.
    ///
    /// `Ok(None)` means the frame was dropped.
    pub fn decode(self, text: &str) -> Result<Option<Envelope>, ProtocolError> {
        match Envelope::from_json(text) {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => match self {
                ParseMode::Lenient => {
                    warn!(error = %e, "Dropping undecodable frame");
                    Ok(None)
                }
                ParseMode::Strict => Err(e),
            },
        }
    }
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMode::Lenient => write!(f, "lenient"),
            ParseMode::Strict => write!(f, "strict"),
        }
    }
}
