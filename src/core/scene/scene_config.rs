//=========================================================================
// Scene Configuration
//=========================================================================
//
// Declarative per-scene configuration: an opaque JSON object handed
// over by the configuration loader and passed through unmodified.
//
// Keys read by the core:
//   "name"      registry key
//   "type"      scene kind discriminator
//   "next"      next-scene target ("__quit" ends the game)
//   "interval"  tick period in milliseconds
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

//=== Internal Dependencies ===============================================

use super::NextScene;
use crate::core::error::{StageError, StageResult};

//=== SceneConfig =========================================================

/// Generic key/value configuration of one scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneConfig {
    fields: Map<String, Value>,
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a decoded JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> StageResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(StageError::InvalidArgument(format!(
                "scene configuration must be an object, got {}",
                other
            ))),
        }
    }

    /// Adds or replaces a key (builder style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    //--- Well-Known Keys --------------------------------------------------

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// Raw `type` discriminator; not necessarily a string.
    pub fn scene_type(&self) -> Option<&Value> {
        self.fields.get("type")
    }

    pub fn next_scene(&self) -> NextScene {
        NextScene::from_target(self.get_str("next"))
    }

    pub fn interval_ms(&self) -> Option<u64> {
        self.get_u64("interval")
    }

    //--- Generic Accessors ------------------------------------------------

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.fields.get(key).and_then(Value::as_array)
    }

    /// Reads either a single string or an array of strings.
    ///
    /// Returns `None` if the key is missing or any element is not a string.
    pub fn get_str_list(&self, key: &str) -> Option<Vec<String>> {
        match self.fields.get(key)? {
            Value::String(s) => Some(vec![s.clone()]),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for SceneConfig {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
