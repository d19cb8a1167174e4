use foundation::ids::NodeRef;
use runtime::event_bus::{EventBus, ListenerId};
use serde::Serialize;
use tracing::debug;

/// Default name of the event published when an overview node is clicked.
pub const FOCUS_EVENT: &str = "birdViewNodeFocus";

/// Request for the primary view to bring `id` into focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEvent {
    pub id: NodeRef,
}

/// Wire shape of the event payload: `{ "id": "..." }`.
#[derive(Debug, Serialize)]
pub struct FocusDetail<'a> {
    pub id: &'a str,
}

impl FocusEvent {
    pub fn detail(&self) -> FocusDetail<'_> {
        FocusDetail {
            id: self.id.as_str(),
        }
    }
}

/// Publishes focus requests to whoever drives the primary view.
///
/// Clones share one listener list, so the renderer and every click handler
/// it installs publish to the same subscribers.
#[derive(Debug, Clone, Default)]
pub struct FocusDispatcher {
    bus: EventBus<FocusEvent>,
}

impl FocusDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&FocusEvent) + 'static) -> ListenerId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.bus.listener_count()
    }

    /// Emits one [`FocusEvent`] synchronously; returns the number of listeners reached.
    pub fn dispatch_focus(&self, id: &NodeRef) -> usize {
        let delivered = self.bus.emit(&FocusEvent { id: id.clone() });
        debug!(node = %id, delivered, "overview node focus");
        delivered
    }
}
