//! Events flowing through the mission.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of an event, matched against transition triggers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named event with an optional payload.
///
/// # Example
///
/// ```rust
/// use sortie::core::Event;
/// use serde_json::json;
///
/// let event = Event::new("count").with_payload(json!({ "count": 3 }));
/// assert!(event.is("count"));
/// assert_eq!(event.payload().unwrap()["count"], 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl Event {
    /// Identifier of the synthetic event passed to `on_enter` by
    /// [`StateMachine::start`](crate::machine::StateMachine::start).
    pub const START: &'static str = "$start";

    pub fn new(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            payload: None,
        }
    }

    /// The synthetic start event.
    pub fn start() -> Self {
        Self::new(Self::START)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn is(&self, id: &str) -> bool {
        self.id.as_str() == id
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_event_has_reserved_id() {
        assert!(Event::start().is(Event::START));
        assert!(Event::start().payload().is_none());
    }

    #[test]
    fn payload_is_optional_in_json() {
        let json = serde_json::to_string(&Event::new("hold")).unwrap();
        assert_eq!(json, r#"{"id":"hold"}"#);

        let event: Event = serde_json::from_str(r#"{"id":"count","payload":{"count":2}}"#).unwrap();
        assert_eq!(event.payload(), Some(&json!({ "count": 2 })));
    }

    #[test]
    fn event_id_displays_raw() {
        assert_eq!(EventId::from("say").to_string(), "say");
    }
}
