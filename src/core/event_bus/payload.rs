//=========================================================================
// Event Payloads and Records
//=========================================================================
//
// `Payload` is the opaque key/value mapping handed to listener hooks.
// `EventRecord` is what sits in the bus queue between `post` and `pump`.
//
// Well-known keys:
//   "scene"           scene name (leave/load/interval events)
//   "time"            current time in milliseconds (interval tick)
//   "silent_entering" / "silent_leaving"   load_scene flags
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

//=== Internal Dependencies ===============================================

use super::event_kind::EventKind;
use super::listener::ListenerId;

//=== Keys ================================================================

pub const SCENE_KEY: &str = "scene";
pub const TIME_KEY: &str = "time";
pub const SILENT_ENTERING_KEY: &str = "silent_entering";
pub const SILENT_LEAVING_KEY: &str = "silent_leaving";

//=== Payload =============================================================

/// Opaque mapping carried by an event.
///
/// The bus never inspects it. An event posted without data carries the
/// empty payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload referencing a scene by name.
    pub fn for_scene(name: impl Into<String>) -> Self {
        Self::new().with(SCENE_KEY, name.into())
    }

    /// Payload carrying the current time, as posted with interval ticks.
    pub fn at_time(now_ms: u64) -> Self {
        Self::new().with(TIME_KEY, now_ms)
    }

    /// Adds or replaces a field (builder style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// Scene name referenced by this payload, if any.
    pub fn scene(&self) -> Option<&str> {
        self.get_str(SCENE_KEY)
    }

    /// Time carried by this payload, if any.
    pub fn time(&self) -> Option<u64> {
        self.get_u64(TIME_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

//=== EventRecord =========================================================

/// A queued event. Immutable once posted.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    kind: EventKind,
    payload: Payload,
    target: Option<ListenerId>,
}

impl EventRecord {
    pub fn new(kind: EventKind, payload: Payload, target: Option<ListenerId>) -> Self {
        Self {
            kind,
            payload,
            target,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Listener this record is addressed to, or `None` for a broadcast.
    pub fn target(&self) -> Option<ListenerId> {
        self.target
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn helpers_read_well_known_keys() {
        let payload = Payload::for_scene("menu").with(TIME_KEY, 1500u64);
        assert_eq!(payload.scene(), Some("menu"));
        assert_eq!(payload.time(), Some(1500));
        assert!(!payload.is_empty());
    }

    #[test]
    fn wrongly_typed_values_read_as_absent() {
        let payload = Payload::new().with(SCENE_KEY, 12).with(TIME_KEY, "soon");
        assert_eq!(payload.scene(), None);
        assert_eq!(payload.time(), None);
    }

    #[test]
    fn deserializes_from_plain_object() {
        let payload: Payload =
            serde_json::from_value(json!({ "scene": "story", "silent_leaving": true }))
                .unwrap();
        assert_eq!(payload.scene(), Some("story"));
        assert_eq!(payload.get_bool(SILENT_LEAVING_KEY), Some(true));
    }

    #[test]
    fn record_exposes_its_parts() {
        let record = EventRecord::new(EventKind::PauseGame, Payload::new(), None);
        assert_eq!(record.kind(), EventKind::PauseGame);
        assert!(record.payload().is_empty());
        assert_eq!(record.target(), None);
    }
}
