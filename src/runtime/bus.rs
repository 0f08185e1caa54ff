//! Single event bus shared by every publisher of a mission.
//!
//! External command sources (a mission UI, a computer-vision service) and
//! guidance modes all publish into the same queue through named
//! [`Publisher`] handles. Delivery is FIFO per publisher; the mission drains
//! the bus, notifies subscribers, then dispatches each event to the state
//! machine.

use crate::core::{Event, EventId};
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised when publishing.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BusError {
    #[error("event bus closed: '{event}' from '{publisher}' was not delivered")]
    Closed { publisher: String, event: String },
}

/// An event tagged with the name of the publisher that sent it.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub publisher: Arc<str>,
    pub event: Event,
}

/// Cloneable, thread-safe publishing handle.
#[derive(Clone)]
pub struct Publisher {
    name: Arc<str>,
    tx: Sender<Envelope>,
}

impl Publisher {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue an event. Never blocks.
    pub fn publish(&self, event: Event) -> Result<(), BusError> {
        let envelope = Envelope {
            publisher: Arc::clone(&self.name),
            event,
        };
        self.tx.send(envelope).map_err(|err| BusError::Closed {
            publisher: self.name.to_string(),
            event: err.0.event.id().to_string(),
        })
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher").field("name", &self.name).finish()
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer invoked for every drained event with a matching identifier.
pub type EventHandler = Box<dyn FnMut(&Event) + Send>;

struct Subscription {
    id: SubscriptionId,
    event: EventId,
    handler: EventHandler,
}

/// Multi-publisher, single-consumer event queue with observers.
///
/// # Example
///
/// ```rust
/// use sortie::core::Event;
/// use sortie::runtime::EventBus;
///
/// let mut bus = EventBus::new();
/// let ui = bus.publisher("ui");
/// ui.publish(Event::new("say")).unwrap();
///
/// let envelope = bus.try_next().unwrap();
/// assert_eq!(&*envelope.publisher, "ui");
/// assert!(envelope.event.is("say"));
/// assert!(bus.try_next().is_none());
/// ```
pub struct EventBus {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
    subscriptions: Vec<Subscription>,
    next_subscription: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            subscriptions: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a named publisher feeding this bus.
    pub fn publisher(&self, name: &str) -> Publisher {
        Publisher {
            name: Arc::from(name),
            tx: self.tx.clone(),
        }
    }

    /// Register an observer for events with identifier `event`.
    pub fn subscribe<F>(&mut self, event: impl Into<EventId>, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.push(Subscription {
            id,
            event: event.into(),
            handler: Box::new(handler),
        });
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Take the next queued event without blocking.
    pub fn try_next(&mut self) -> Option<Envelope> {
        match self.rx.try_recv() {
            Ok(envelope) => Some(envelope),
            // The bus holds a sender itself, so the queue cannot disconnect.
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Invoke every observer subscribed to this event's identifier.
    pub fn notify(&mut self, event: &Event) {
        for subscription in &mut self.subscriptions {
            if &subscription.event == event.id() {
                (subscription.handler)(event);
            }
        }
    }

    /// Discard every queued event, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn fifo_per_publisher() {
        let mut bus = EventBus::new();
        let ui = bus.publisher("ui");
        let guidance = bus.publisher("guidance");

        ui.publish(Event::new("a1")).unwrap();
        guidance.publish(Event::new("b1")).unwrap();
        ui.publish(Event::new("a2")).unwrap();
        guidance.publish(Event::new("b2")).unwrap();

        let mut from_ui = Vec::new();
        let mut from_guidance = Vec::new();
        while let Some(envelope) = bus.try_next() {
            let id = envelope.event.id().to_string();
            match &*envelope.publisher {
                "ui" => from_ui.push(id),
                _ => from_guidance.push(id),
            }
        }
        assert_eq!(from_ui, ["a1", "a2"]);
        assert_eq!(from_guidance, ["b1", "b2"]);
    }

    #[test]
    fn publishers_work_across_threads() {
        let mut bus = EventBus::new();
        let publisher = bus.publisher("worker");
        std::thread::spawn(move || publisher.publish(Event::new("done")).unwrap())
            .join()
            .unwrap();
        assert!(bus.try_next().unwrap().event.is("done"));
    }

    #[test]
    fn publish_after_drop_reports_closed() {
        let bus = EventBus::new();
        let publisher = bus.publisher("ui");
        drop(bus);

        let err = publisher.publish(Event::new("say")).unwrap_err();
        assert_eq!(
            err,
            BusError::Closed {
                publisher: "ui".to_string(),
                event: "say".to_string()
            }
        );
    }

    #[test]
    fn subscribers_only_see_matching_events() {
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = std::sync::Arc::clone(&seen);
        bus.subscribe("count", move |event: &Event| {
            sink.lock().unwrap().push(event.id().to_string());
        });

        bus.notify(&Event::new("count"));
        bus.notify(&Event::new("say"));
        bus.notify(&Event::new("count"));

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let hits = std::sync::Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let counter = std::sync::Arc::clone(&hits);
        let id = bus.subscribe("say", move |_: &Event| *counter.lock().unwrap() += 1);

        bus.notify(&Event::new("say"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.notify(&Event::new("say"));

        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn clear_drops_queued_events() {
        let mut bus = EventBus::new();
        let ui = bus.publisher("ui");
        ui.publish(Event::new("a")).unwrap();
        ui.publish(Event::new("b")).unwrap();
        assert_eq!(bus.clear(), 2);
        assert!(bus.try_next().is_none());
    }
}
