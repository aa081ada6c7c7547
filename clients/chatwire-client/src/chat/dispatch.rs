//! Message Dispatcher
//!
//! Pure mapping from connection events to render instructions. Nothing in
//! here touches a rendering surface; [`ChatView`](crate::chat::view::ChatView)
//! implementations apply the instructions.

use chrono::{DateTime, Local, Utc};

use crate::connection::protocol::{ChatPayload, Envelope};
use crate::connection::websocket::ConnectionEvent;

/// Visual category of a bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleKind {
    Message,
    OwnMessage,
    Info,
    Warning,
    Error,
}

impl BubbleKind {
    /// Container class names the chat log is styled by
    pub fn class_name(&self) -> &'static str {
        match self {
            BubbleKind::Message => "Message_Container",
            BubbleKind::OwnMessage => "Message_Container Own_Message",
            BubbleKind::Info => "Message_Container Info",
            BubbleKind::Warning => "Message_Container Warning",
            BubbleKind::Error => "Message_Container Error",
        }
    }
}

/// One rendered chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub kind: BubbleKind,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Bubble {
    /// `HH:MM` in local time
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }

    /// Only messages from other users ask for attention
    pub fn wants_notification(&self) -> bool {
        self.kind == BubbleKind::Message
    }
}

/// The connection indicator shown above the chat log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Hidden,
    Connecting { endpoint: String },
    Disconnected { reason: Option<String> },
    GaveUp { attempts: u32 },
}

impl Banner {
    pub fn text(&self) -> Option<String> {
        match self {
            Banner::Hidden => None,
            Banner::Connecting { endpoint } => Some(format!("Trying to connect to \"{}\"", endpoint)),
            Banner::Disconnected { reason: Some(reason) } => Some(format!("Disconnected: {}", reason)),
            Banner::Disconnected { reason: None } => Some("Disconnected".to_string()),
            Banner::GaveUp { attempts } => Some(format!(
                "Could not reach a chat server after {} attempts",
                attempts
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInstruction {
    AppendBubble(Bubble),
    ReplaceUserlist(Vec<String>),
    SetBanner(Banner),
}

/// Map a decoded envelope to what should be rendered, given our own name.
///
/// `Username_Change` frames from the server render nothing.
pub fn dispatch(envelope: &Envelope, identity: &str) -> Option<RenderInstruction> {
    let (kind, payload) = match envelope {
        Envelope::Message(payload) => (BubbleKind::Message, payload),
        Envelope::Info(payload) => (BubbleKind::Info, payload),
        Envelope::Error(payload) => (BubbleKind::Error, payload),
        Envelope::Userlist(payload) => {
            return Some(RenderInstruction::ReplaceUserlist(payload.username.clone()));
        }
        Envelope::UsernameChange(_) => return None,
    };

    let kind = if payload.author == identity {
        BubbleKind::OwnMessage
    } else {
        kind
    };

    Some(RenderInstruction::AppendBubble(bubble_from_payload(kind, payload)))
}

fn bubble_from_payload(kind: BubbleKind, payload: &ChatPayload) -> Bubble {
    Bubble {
        kind,
        author: payload.author.clone(),
        text: payload.message.clone(),
        timestamp: DateTime::from_timestamp_millis(payload.timestamp_millis()).unwrap_or_default(),
    }
}

/// Map any connection event to render instructions
pub fn instructions_for(event: &ConnectionEvent, identity: &str) -> Vec<RenderInstruction> {
    match event {
        ConnectionEvent::Connecting { endpoint, .. } => {
            vec![RenderInstruction::SetBanner(Banner::Connecting {
                endpoint: endpoint.clone(),
            })]
        }
        ConnectionEvent::Open { .. } => vec![
            RenderInstruction::AppendBubble(Bubble {
                kind: BubbleKind::Info,
                author: "Info".to_string(),
                text: "Connection established!".to_string(),
                timestamp: Utc::now(),
            }),
            RenderInstruction::SetBanner(Banner::Hidden),
        ],
        ConnectionEvent::Closed { reason, .. } => {
            vec![RenderInstruction::SetBanner(Banner::Disconnected {
                reason: reason.clone(),
            })]
        }
        ConnectionEvent::Frame(envelope) => dispatch(envelope, identity).into_iter().collect(),
        ConnectionEvent::Rejected(error) => {
            tracing::error!(error = %error, "Server sent a frame this client cannot decode");
            Vec::new()
        }
        ConnectionEvent::GaveUp { attempts } => {
            vec![RenderInstruction::SetBanner(Banner::GaveUp { attempts: *attempts })]
        }
    }
}
