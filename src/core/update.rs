//! Mutation requests passed to a store's `set` primitive.

use serde_json::{Map, Value};
use std::fmt;

/// Shape of a partial state update.
///
/// The store engine interprets each form against the current state data, a
/// JSON object with one member per slice:
///
/// - `Merge`: the given members are merged into the top level of the state
///   (or become the whole state when the update replaces).
/// - `With`: the partial is computed from the current state, then merged.
/// - `Draft`: the closure edits a draft copy of the state in place and the
///   draft becomes the next state.
pub enum Update {
    Merge(Map<String, Value>),
    With(Box<dyn FnOnce(&Map<String, Value>) -> Map<String, Value> + Send>),
    Draft(Box<dyn FnOnce(&mut Map<String, Value>) + Send>),
}

impl Update {
    /// Merge a JSON object into the top level of the state.
    ///
    /// Non-object values are treated as an empty partial.
    ///
    /// # Example
    ///
    /// ```rust
    /// use slicestate::core::Update;
    /// use serde_json::json;
    ///
    /// let update = Update::merge(json!({ "counter": { "value": 1 } }));
    /// assert!(matches!(update, Update::Merge(ref m) if m.contains_key("counter")));
    /// ```
    pub fn merge(partial: Value) -> Self {
        match partial {
            Value::Object(map) => Update::Merge(map),
            _ => Update::Merge(Map::new()),
        }
    }

    /// Compute a partial from the current state.
    pub fn with<F>(f: F) -> Self
    where
        F: FnOnce(&Map<String, Value>) -> Map<String, Value> + Send + 'static,
    {
        Update::With(Box::new(f))
    }

    /// Edit a draft copy of the current state.
    ///
    /// # Example
    ///
    /// ```rust
    /// use slicestate::core::Update;
    /// use serde_json::json;
    ///
    /// let update = Update::draft(|state| {
    ///     state["counter"]["value"] = json!(1);
    /// });
    /// assert!(matches!(update, Update::Draft(_)));
    /// ```
    pub fn draft<F>(f: F) -> Self
    where
        F: FnOnce(&mut Map<String, Value>) + Send + 'static,
    {
        Update::Draft(Box::new(f))
    }

    /// Resolve the update against `current`, producing the next state data.
    pub(crate) fn apply(self, current: &Map<String, Value>, replace: bool) -> Map<String, Value> {
        match self {
            Update::Merge(partial) => merge_into(current, partial, replace),
            Update::With(f) => merge_into(current, f(current), replace),
            Update::Draft(f) => {
                let mut draft = current.clone();
                f(&mut draft);
                draft
            }
        }
    }
}

fn merge_into(
    current: &Map<String, Value>,
    partial: Map<String, Value>,
    replace: bool,
) -> Map<String, Value> {
    if replace {
        return partial;
    }
    let mut next = current.clone();
    for (key, value) in partial {
        next.insert(key, value);
    }
    next
}

impl From<Value> for Update {
    fn from(value: Value) -> Self {
        Update::merge(value)
    }
}

impl From<Map<String, Value>> for Update {
    fn from(map: Map<String, Value>) -> Self {
        Update::Merge(map)
    }
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Merge(map) => f.debug_tuple("Merge").field(map).finish(),
            Update::With(_) => f.write_str("With(..)"),
            Update::Draft(_) => f.write_str("Draft(..)"),
        }
    }
}

/// The `(update, replace, label)` triple handed to the `set` primitive.
#[derive(Debug)]
pub struct MutationEnvelope {
    /// The partial update
    pub update: Update,
    /// Replace the whole state instead of merging into it
    pub replace: bool,
    /// Action label for the devtools subscriber
    pub label: Option<String>,
}

impl MutationEnvelope {
    /// Create a merging, unlabeled envelope.
    pub fn new(update: impl Into<Update>) -> Self {
        Self {
            update: update.into(),
            replace: false,
            label: None,
        }
    }

    /// Replace the whole state.
    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Attach an explicit action label.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// True when a non-empty label is present.
    pub fn has_label(&self) -> bool {
        self.label.as_deref().is_some_and(|label| !label.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> Map<String, Value> {
        match json!({ "bear": { "bears": 1 }, "fish": { "fishes": 4 } }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn merge_keeps_untouched_members() {
        let next = Update::merge(json!({ "bear": { "bears": 2 } })).apply(&state(), false);

        assert_eq!(next["bear"]["bears"], json!(2));
        assert_eq!(next["fish"]["fishes"], json!(4));
    }

    #[test]
    fn merge_is_shallow() {
        let next = Update::merge(json!({ "bear": {} })).apply(&state(), false);

        assert_eq!(next["bear"], json!({}));
    }

    #[test]
    fn replace_drops_other_members() {
        let next = Update::merge(json!({ "bear": { "bears": 0 } })).apply(&state(), true);

        assert_eq!(next.len(), 1);
        assert!(!next.contains_key("fish"));
    }

    #[test]
    fn with_reads_current_state() {
        let next = Update::with(|s| {
            let bears = s["bear"]["bears"].as_i64().unwrap_or(0);
            let mut partial = Map::new();
            partial.insert("bear".into(), json!({ "bears": bears + 10 }));
            partial
        })
        .apply(&state(), false);

        assert_eq!(next["bear"]["bears"], json!(11));
    }

    #[test]
    fn draft_edits_nested_fields() {
        let next = Update::draft(|s| {
            s["fish"]["fishes"] = json!(0);
        })
        .apply(&state(), false);

        assert_eq!(next["fish"]["fishes"], json!(0));
        assert_eq!(next["bear"]["bears"], json!(1));
    }

    #[test]
    fn non_object_merge_is_empty_partial() {
        let next = Update::merge(json!(42)).apply(&state(), false);

        assert_eq!(next, state());
    }

    #[test]
    fn empty_label_counts_as_missing() {
        let envelope = MutationEnvelope::new(json!({})).labeled("");
        assert!(!envelope.has_label());

        let envelope = MutationEnvelope::new(json!({})).labeled("bear/addBear");
        assert!(envelope.has_label());
        assert!(!envelope.replace);
    }
}
