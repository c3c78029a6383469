//! Top-level field diffs between two states

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::GameState;
use super::visibility::{self, VisibilityFilter};

/// The top-level fields whose value changed, each carrying its whole new value.
///
/// A diff never describes removed fields: a key dropped from the new state is
/// not reported and stays in any state the diff is applied to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff(GameState);

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn changes(&self) -> &GameState {
        &self.0
    }

    pub fn into_changes(self) -> GameState {
        self.0
    }

    /// Drop the changes a recipient is not allowed to see
    pub fn narrow(&self, filter: &VisibilityFilter) -> Diff {
        match filter {
            VisibilityFilter::Full => self.clone(),
            VisibilityFilter::Fields(fields) => Diff(visibility::select(&self.0, fields)),
        }
    }
}

impl From<GameState> for Diff {
    fn from(changes: GameState) -> Self {
        Self(changes)
    }
}

/// Compute the fields of `new` that differ from `old`.
///
/// Values are compared structurally over their whole subtree, so separately
/// built but equal nested values produce no entry. A key missing from `old`
/// always counts as changed.
pub fn diff(old: &GameState, new: &GameState) -> Diff {
    let changes = new
        .iter()
        .filter(|(key, value)| old.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Diff(changes)
}

/// Merge a diff into a copy of `state`, last writer wins per top-level key
pub fn apply_diff(state: &GameState, diff: &Diff) -> GameState {
    let mut next = state.clone();
    for (key, value) in &diff.0 {
        next.insert(key.clone(), value.clone());
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> GameState {
        match value {
            Value::Object(map) => map,
            _ => panic!("test state must be an object"),
        }
    }

    #[test]
    fn grid_move_diff() {
        let a = state(json!({ "board": [[null, null], [null, null]], "turn": "X" }));
        let b = state(json!({ "board": [["X", null], [null, null]], "turn": "O" }));

        let d = diff(&a, &b);
        assert_eq!(
            d.changes(),
            &state(json!({ "board": [["X", null], [null, null]], "turn": "O" }))
        );
        assert_eq!(apply_diff(&a, &d), b);
    }

    #[test]
    fn equal_states_diff_empty() {
        let a = state(json!({ "players": [{ "id": 1, "pos": { "x": 3, "y": 4 } }], "turn": 7 }));
        let b = state(json!({ "players": [{ "id": 1, "pos": { "x": 3, "y": 4 } }], "turn": 7 }));
        assert!(diff(&a, &a).is_empty());
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn only_changed_keys_are_emitted() {
        let a = state(json!({ "score": 1, "snake": [[0, 0]], "food": [5, 5] }));
        let b = state(json!({ "score": 2, "snake": [[0, 0]], "food": [5, 5] }));
        let d = diff(&a, &b);
        assert_eq!(d.keys().collect::<Vec<_>>(), ["score"]);
        assert_eq!(d.get("score"), Some(&json!(2)));
    }

    #[test]
    fn new_key_counts_as_change() {
        let a = state(json!({ "turn": "X" }));
        let b = state(json!({ "turn": "X", "winner": null }));
        let d = diff(&a, &b);
        assert_eq!(d.len(), 1);
        assert_eq!(d.get("winner"), Some(&Value::Null));
    }

    #[test]
    fn removed_key_is_not_reported() {
        let a = state(json!({ "turn": "X", "pending": true }));
        let b = state(json!({ "turn": "X" }));
        let d = diff(&a, &b);
        assert!(d.is_empty());
        assert_eq!(apply_diff(&a, &d)["pending"], json!(true));
    }

    #[test]
    fn merge_is_shallow_and_replaces_whole_values() {
        let a = state(json!({ "tank": { "x": 1, "y": 2, "hp": 100 }, "bullets": [] }));
        let d = Diff::from(state(json!({ "tank": { "x": 5 } })));
        let merged = apply_diff(&a, &d);
        assert_eq!(merged["tank"], json!({ "x": 5 }));
        assert_eq!(merged["bullets"], json!([]));
        // input untouched
        assert_eq!(a["tank"]["hp"], json!(100));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let a = state(json!({ "round": 1, "strokes": [] }));
        let b = state(json!({ "round": 2, "strokes": [[1, 2, 3]] }));
        let d = diff(&a, &b);
        let once = apply_diff(&a, &d);
        assert_eq!(apply_diff(&once, &d), once);
    }

    #[test]
    fn diff_follows_new_state_order() {
        let a = state(json!({}));
        let b = state(json!({ "z": 1, "a": 2, "m": 3 }));
        assert_eq!(diff(&a, &b).keys().collect::<Vec<_>>(), ["z", "a", "m"]);
    }

    #[test]
    fn narrowing_hides_filtered_changes() {
        let d = Diff::from(state(json!({ "board": [1], "hiddenHand": ["Q"] })));
        let narrowed = d.narrow(&VisibilityFilter::fields(["board"]));
        assert_eq!(narrowed.keys().collect::<Vec<_>>(), ["board"]);
        assert_eq!(d.narrow(&VisibilityFilter::Full), d);
    }
}
