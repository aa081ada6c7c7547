//! Feeds connection events through the dispatcher into a view

use tokio::sync::mpsc;

use super::dispatch::instructions_for;
use super::identity::SessionIdentity;
use super::view::ChatView;
use crate::connection::websocket::ConnectionEvent;

/// Render a single event. Returns the attempt count if the manager gave up.
pub fn render_event<V: ChatView>(
    event: &ConnectionEvent,
    identity: &SessionIdentity,
    view: &mut V,
) -> Option<u32> {
    let name = identity.get();
    for instruction in instructions_for(event, &name) {
        view.apply(&instruction);
    }

    match event {
        ConnectionEvent::GaveUp { attempts } => Some(*attempts),
        _ => None,
    }
}

/// Render events until the manager stops sending them
pub async fn drive<V: ChatView>(
    events: &mut mpsc::Receiver<ConnectionEvent>,
    identity: &SessionIdentity,
    view: &mut V,
) {
    while let Some(event) = events.recv().await {
        if render_event(&event, identity, view).is_some() {
            break;
        }
    }
}
