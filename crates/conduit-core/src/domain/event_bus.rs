//! Synchronous broadcast channel for [`FlowEvent`]s
//!
//! `emit` delivers to every current subscriber, in subscription order,
//! before it returns. A handler may emit again while handling; the nested
//! emission runs to completion before the outer one moves on to its next
//! subscriber. Handlers see the subscriber list as it was when their
//! emission started.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::trace;

use super::events::FlowEvent;

/// Subscriber callback
pub type EventHandler = Arc<dyn Fn(&FlowEvent) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    handlers: RwLock<Vec<(u64, EventHandler)>>,
    next_id: AtomicU64,
}

/// Single broadcast channel shared by the store and the pages observing it
#[derive(Clone, Default)]
pub struct FlowEventBus {
    inner: Arc<BusInner>,
}

impl FlowEventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; it receives every event emitted from now on
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&FlowEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to all subscribers before returning
    pub fn emit(&self, event: FlowEvent) {
        let handlers: Vec<EventHandler> = self
            .inner
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        trace!(kind = event.kind(), subscribers = handlers.len(), "Emitting flow event");

        for handler in handlers {
            handler(&event);
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Handle returned by [`FlowEventBus::subscribe`]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Remove the handler from the bus. Has no effect once the bus is gone.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.bus.upgrade() {
            inner
                .handlers
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
