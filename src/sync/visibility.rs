//! Per-recipient visibility narrowing

use std::borrow::Cow;

use super::state::GameState;

/// Fields a recipient may see, as decided by the room's authorization policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VisibilityFilter {
    /// No filter: the recipient sees the whole state
    #[default]
    Full,
    /// Only these top-level fields, in this order
    Fields(Vec<String>),
}

impl VisibilityFilter {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(fields.into_iter().map(Into::into).collect())
    }

    /// Whether a top-level field is visible under this filter
    pub fn allows(&self, field: &str) -> bool {
        match self {
            Self::Full => true,
            Self::Fields(fields) => fields.iter().any(|f| f == field),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

impl From<Option<Vec<String>>> for VisibilityFilter {
    fn from(fields: Option<Vec<String>>) -> Self {
        fields.map_or(Self::Full, Self::Fields)
    }
}

/// Narrow a state to what one recipient may see.
///
/// With [`VisibilityFilter::Full`] the input is returned borrowed, not copied:
/// the result aliases `state` and is meant to be serialized right away.
/// Otherwise a fresh mapping holds the named fields that exist in `state`;
/// names missing from `state` are skipped.
pub fn compress<'a>(state: &'a GameState, filter: &VisibilityFilter) -> Cow<'a, GameState> {
    match filter {
        VisibilityFilter::Full => Cow::Borrowed(state),
        VisibilityFilter::Fields(fields) => Cow::Owned(select(state, fields)),
    }
}

pub(super) fn select(state: &GameState, fields: &[String]) -> GameState {
    let mut visible = GameState::new();
    for field in fields {
        if let Some(value) = state.get(field) {
            visible.insert(field.clone(), value.clone());
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn state(value: Value) -> GameState {
        match value {
            Value::Object(map) => map,
            _ => panic!("test state must be an object"),
        }
    }

    #[test]
    fn no_filter_borrows_input() {
        let s = state(json!({ "board": [1, 2], "hiddenHand": ["A"] }));
        let out = compress(&s, &VisibilityFilter::Full);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(*out, s);
    }

    #[test]
    fn filter_keeps_only_named_fields() {
        let s = state(json!({ "board": [[null]], "hiddenHand": ["A", "K"], "turn": "X" }));
        let out = compress(&s, &VisibilityFilter::fields(["board"]));
        assert_eq!(out.into_owned(), state(json!({ "board": [[null]] })));
    }

    #[test]
    fn missing_fields_are_skipped() {
        let s = state(json!({ "board": [], "turn": "X" }));
        let out = compress(&s, &VisibilityFilter::fields(["turn", "ghost"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out["turn"], json!("X"));

        let none = compress(&s, &VisibilityFilter::fields(["nothing", "here"]));
        assert!(none.is_empty());
    }

    #[test]
    fn result_is_a_subset_of_filter_and_state() {
        let s = state(json!({ "a": 1, "b": 2, "c": 3 }));
        let filter = VisibilityFilter::fields(["c", "a", "z"]);
        let out = compress(&s, &filter);
        for key in out.keys() {
            assert!(filter.allows(key));
            assert!(s.contains_key(key));
        }
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, ["c", "a"]);
    }

    #[test]
    fn optional_field_list_maps_to_filter() {
        assert!(VisibilityFilter::from(None).is_full());
        let filter = VisibilityFilter::from(Some(vec!["board".to_string()]));
        assert!(filter.allows("board"));
        assert!(!filter.allows("hiddenHand"));
    }
}
