//! Game state values and their transmittable snapshot form

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};

use super::error::SnapshotError;

/// One room's game state: string keys mapped to JSON-like values.
///
/// Keys keep their insertion order, so snapshots and diffs list fields in the
/// order the owning game module created them.
pub type GameState = Map<String, Value>;

/// Transmittable text encoding of a [`GameState`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Encoded size in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Snapshot {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl AsRef<str> for Snapshot {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode a state for transmission
pub fn serialize(state: &GameState) -> Snapshot {
    match serde_json::to_string(state) {
        Ok(text) => Snapshot(text),
        // Only non-string map keys make this fail, and a GameState cannot hold any
        Err(e) => {
            error!(error = %e, "Failed to encode game state");
            Snapshot(String::from("{}"))
        }
    }
}

/// Decode a snapshot produced by [`serialize`].
///
/// Failures are logged and returned; the caller should answer them by
/// requesting a full resync.
pub fn deserialize(snapshot: impl AsRef<str>) -> Result<GameState, SnapshotError> {
    let text = snapshot.as_ref();
    let value: Value = serde_json::from_str(text).map_err(|e| {
        warn!(error = %e, bytes = text.len(), "Failed to parse snapshot");
        SnapshotError::Malformed(e)
    })?;

    into_state(value).map_err(|e| {
        warn!(error = %e, "Snapshot rejected");
        e
    })
}

/// Deep copy of a state. The copy shares nothing with the original.
pub fn clone_state(state: &GameState) -> GameState {
    state.clone()
}

/// Convert a typed game state into a [`GameState`]
pub fn to_state<T: Serialize>(value: &T) -> Result<GameState, SnapshotError> {
    let value = serde_json::to_value(value).map_err(SnapshotError::Encode)?;
    into_state(value)
}

/// Convert a [`GameState`] back into a typed game state
pub fn from_state<T: DeserializeOwned>(state: &GameState) -> Result<T, SnapshotError> {
    serde_json::from_value(Value::Object(state.clone())).map_err(SnapshotError::Decode)
}

fn into_state(value: Value) -> Result<GameState, SnapshotError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SnapshotError::NotAnObject {
            found: kind_of(&other),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
