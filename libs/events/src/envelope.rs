//! Event envelope - the common wrapper for all events.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use superschema_id::Uuid4;

use crate::error::EventError;
use crate::validator::validate_event;

/// Separator between an event name and its version suffix.
pub const VERSION_SEPARATOR: char = ':';

/// Returns the base type of an event type string.
///
/// `"Order:2"` has base type `"Order"`; a type without a colon is its own base
/// type. Only the first colon counts, so `"Order:2:beta"` is also `"Order"`.
pub fn base_type(event_type: &str) -> &str {
    match event_type.split_once(VERSION_SEPARATOR) {
        Some((base, _)) => base,
        None => event_type,
    }
}

/// Tracing and authorization metadata carried by every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Correlation ID, shared by everything stemming from one initiating action.
    pub cid: Uuid4,

    /// Transaction ID, shared by the events of one transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<Uuid4>,

    /// Producer ID of the emitting service instance.
    pub pid: Uuid4,

    /// User or tenant ID of the acting principal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid4>,

    /// Bearer token authorizing the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Fields this envelope does not define, kept as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventMetadata {
    pub fn new(cid: Uuid4, pid: Uuid4) -> Self {
        Self {
            cid,
            tid: None,
            pid,
            uid: None,
            token: None,
            extra: Map::new(),
        }
    }

    pub fn with_tid(mut self, tid: Uuid4) -> Self {
        self.tid = Some(tid);
        self
    }

    pub fn with_uid(mut self, uid: Uuid4) -> Self {
        self.uid = Some(uid);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Metadata for a follow-up event emitted by producer `pid` in the same flow.
    ///
    /// Keeps the correlation, transaction and user IDs and the token.
    pub fn child(&self, pid: Uuid4) -> Self {
        Self {
            pid,
            ..self.clone()
        }
    }
}

/// The event envelope.
///
/// Serializes with the wire field names `id`, `type`, `metadata`, `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique message ID.
    pub id: Uuid4,

    /// Event type name, optionally suffixed with `:<version>`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Tracing and authorization metadata.
    pub metadata: EventMetadata,

    /// Event-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,

    /// Fields this envelope does not define, kept as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Creates an event with a fresh ID and no payload.
    pub fn new(event_type: impl Into<String>, metadata: EventMetadata) -> Self {
        Self {
            id: Uuid4::new(),
            event_type: event_type.into(),
            metadata,
            data: None,
            extra: Map::new(),
        }
    }

    /// Creates a new event builder.
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// The event type without its version suffix.
    pub fn base_type(&self) -> &str {
        base_type(&self.event_type)
    }

    /// The version suffix of the event type, if any.
    pub fn version(&self) -> Option<&str> {
        self.event_type
            .split_once(VERSION_SEPARATOR)
            .map(|(_, version)| version)
    }

    /// Decodes the payload into a concrete type.
    ///
    /// Returns `Ok(None)` when the event carries no payload.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>, EventError> {
        self.data
            .as_ref()
            .map(|data| serde_json::from_value(Value::Object(data.clone())))
            .transpose()
            .map_err(EventError::from)
    }

    /// Converts the event into its JSON form.
    pub fn to_value(&self) -> Result<Value, EventError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl TryFrom<&Value> for Event {
    type Error = EventError;

    /// Validates `value` and decodes it. Unrecognized fields land in `extra`.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        validate_event(value)?;
        Ok(Event::deserialize(value)?)
    }
}

/// Builder for constructing events.
#[derive(Debug, Default)]
pub struct EventBuilder {
    id: Option<Uuid4>,
    event_type: Option<String>,
    metadata: Option<EventMetadata>,
    data: Option<Map<String, Value>>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: Uuid4) -> Self {
        self.id = Some(id);
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Serializes `payload` as the event data. The payload must serialize to
    /// a JSON object.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, EventError> {
        match serde_json::to_value(payload)? {
            Value::Object(map) => {
                self.data = Some(map);
                Ok(self)
            }
            _ => Err(crate::ValidationError::InvalidData.into()),
        }
    }

    /// Builds the event, generating an ID if none was set.
    pub fn build(self) -> Result<Event, EventError> {
        let event_type = self.event_type.ok_or(EventError::MissingField("type"))?;
        if event_type.is_empty() {
            return Err(EventError::EmptyEventType);
        }

        Ok(Event {
            id: self.id.unwrap_or_default(),
            event_type,
            metadata: self.metadata.ok_or(EventError::MissingField("metadata"))?,
            data: self.data,
            extra: Map::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn id(s: &str) -> Uuid4 {
        Uuid4::parse(s).unwrap()
    }

    fn metadata() -> EventMetadata {
        EventMetadata::new(
            id("a47ac10b-58cc-4372-a567-0e02b2c3d479"),
            id("b47ac10b-58cc-4372-a567-0e02b2c3d479"),
        )
    }

    #[test]
    fn test_base_type() {
        assert_eq!(base_type("Order"), "Order");
        assert_eq!(base_type("Order:2"), "Order");
        assert_eq!(base_type("Order:2:beta"), "Order");
        assert_eq!(base_type(":2"), "");
        assert_eq!(base_type(""), "");
    }

    #[test]
    fn test_event_version() {
        let event = Event::new("Order:2", metadata());
        assert_eq!(event.base_type(), "Order");
        assert_eq!(event.version(), Some("2"));
        assert_eq!(Event::new("Order", metadata()).version(), None);
    }

    #[test]
    fn test_event_serialization_uses_wire_names() {
        let event = Event::builder()
            .id(id("f47ac10b-58cc-4372-a567-0e02b2c3d479"))
            .event_type("TestEvent")
            .metadata(metadata())
            .build()
            .unwrap();

        assert_eq!(
            event.to_value().unwrap(),
            json!({
                "id": "f47ac10b-58cc-4372-a567-0e02b2c3d479",
                "type": "TestEvent",
                "metadata": {
                    "cid": "a47ac10b-58cc-4372-a567-0e02b2c3d479",
                    "pid": "b47ac10b-58cc-4372-a567-0e02b2c3d479",
                },
            })
        );
    }

    #[test]
    fn test_metadata_optional_fields_serialized_when_set() {
        let tid = Uuid4::new();
        let meta = metadata().with_tid(tid).with_token("jwt");
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["tid"], json!(tid.to_string()));
        assert_eq!(value["token"], json!("jwt"));
        assert!(value.get("uid").is_none());
    }

    #[test]
    fn test_metadata_child_keeps_correlation() {
        let uid = Uuid4::new();
        let parent = metadata().with_uid(uid);
        let pid = Uuid4::new();
        let child = parent.child(pid);
        assert_eq!(child.cid, parent.cid);
        assert_eq!(child.uid, Some(uid));
        assert_eq!(child.pid, pid);
    }

    #[test]
    fn test_builder_requires_type_and_metadata() {
        assert_eq!(
            Event::builder().metadata(metadata()).build().unwrap_err(),
            EventError::MissingField("type")
        );
        assert_eq!(
            Event::builder().event_type("X").build().unwrap_err(),
            EventError::MissingField("metadata")
        );
        assert_eq!(
            Event::builder()
                .event_type("")
                .metadata(metadata())
                .build()
                .unwrap_err(),
            EventError::EmptyEventType
        );
    }

    #[test]
    fn test_builder_payload_must_be_object() {
        #[derive(Serialize)]
        struct Order {
            sku: String,
        }

        let event = Event::builder()
            .event_type("Order")
            .metadata(metadata())
            .payload(&Order { sku: "A-1".into() })
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(event.data.unwrap()["sku"], json!("A-1"));

        let err = Event::builder().payload(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, EventError::InvalidEvent(_)));
    }

    #[test]
    fn test_data_as() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Order {
            qty: u32,
        }

        let mut event = Event::new("Order", metadata());
        assert_eq!(event.data_as::<Order>().unwrap(), None);

        event.data = json!({"qty": 3}).as_object().cloned();
        assert_eq!(event.data_as::<Order>().unwrap(), Some(Order { qty: 3 }));
    }

    #[test]
    fn test_try_from_value_validates() {
        let valid = json!({
            "id": "f47ac10b-58cc-4372-a567-0e02b2c3d479",
            "type": "TestEvent",
            "metadata": {
                "cid": "a47ac10b-58cc-4372-a567-0e02b2c3d479",
                "pid": "b47ac10b-58cc-4372-a567-0e02b2c3d479",
            },
            "extra": true,
        });
        let event = Event::try_from(&valid).unwrap();
        assert_eq!(event.event_type, "TestEvent");
        assert_eq!(event.extra["extra"], json!(true));
        assert_eq!(event.to_value().unwrap(), valid);

        let invalid = json!({"id": "not-a-uuid", "type": "TestEvent"});
        assert_eq!(
            Event::try_from(&invalid).unwrap_err(),
            EventError::InvalidEvent(crate::ValidationError::InvalidId)
        );
    }
}
