//! Records every event delivered on a flow bus.

use conduit_core::{FlowEvent, FlowEventBus, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;

/// Subscribes to a bus and keeps a copy of each event it sees.
///
/// Subscribe after the store is built so the store's reducer has already
/// applied an event by the time it is recorded.
pub struct EventRecorder {
    events: Arc<Mutex<Vec<FlowEvent>>>,
    subscription: Option<Subscription>,
}

impl EventRecorder {
    /// Start recording events emitted on `bus`
    pub fn attach(bus: &FlowEventBus) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let subscription = bus.subscribe(move |event| sink.lock().push(event.clone()));
        Self {
            events,
            subscription: Some(subscription),
        }
    }

    /// Recorded events, oldest first
    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.lock().clone()
    }

    /// Kinds of the recorded events, oldest first
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(FlowEvent::kind).collect()
    }

    /// Number of recorded events of `kind`
    pub fn count(&self, kind: &str) -> usize {
        self.events.lock().iter().filter(|e| e.kind() == kind).count()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Drop for EventRecorder {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
