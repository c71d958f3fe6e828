//! Slices and the composed state they nest into.
//!
//! A slice is a map of JSON data fields plus named actions. The composed
//! state keeps one data object and one action table per slice, keyed by the
//! slice name, in the order the slices were composed.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Name of a slice; both the state namespace and the action label prefix.
pub type SliceName = String;

/// An action exposed by a slice.
///
/// Actions take positional JSON arguments and return a JSON value
/// (`Value::Null` for actions that only mutate).
pub type Action = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Errors from addressing slices and actions in a composed state.
#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("Unknown slice '{0}'")]
    UnknownSlice(String),

    #[error("Slice '{slice}' has no action '{action}'")]
    UnknownAction { slice: String, action: String },
}

/// The state fields and actions produced by one slice constructor.
///
/// # Example
///
/// ```rust
/// use slicestate::core::Slice;
/// use serde_json::json;
///
/// let slice = Slice::new()
///     .field("bears", 0)
///     .action("roar", |_args| json!("roar"));
///
/// assert_eq!(slice.fields()["bears"], json!(0));
/// assert!(slice.has_action("roar"));
/// ```
#[derive(Clone, Default)]
pub struct Slice {
    fields: Map<String, Value>,
    actions: BTreeMap<String, Action>,
}

impl Slice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing JSON object of fields.
    ///
    /// Non-object values yield a slice with no fields.
    pub fn from_fields(fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            fields,
            actions: BTreeMap::new(),
        }
    }

    /// Add a data field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add an action taking arguments and returning a value.
    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    /// Add an action that takes no arguments and returns nothing.
    pub fn command<F>(self, name: impl Into<String>, command: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.action(name, move |_| {
            command();
            Value::Null
        })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl fmt::Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slice")
            .field("fields", &self.fields)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Slice name to slice data and actions.
///
/// Data lives in a single JSON object with one member per slice, so the
/// store's update forms can address any slice. Actions are fixed at
/// composition time and are not part of the data.
#[derive(Clone, Default)]
pub struct ComposedState {
    data: Map<String, Value>,
    actions: BTreeMap<SliceName, BTreeMap<String, Action>>,
}

impl ComposedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nest a slice under `name`.
    ///
    /// Returns `false` and leaves the state unchanged if `name` is already
    /// present.
    pub fn insert_slice(&mut self, name: impl Into<SliceName>, slice: Slice) -> bool {
        let name = name.into();
        if self.data.contains_key(&name) {
            return false;
        }
        self.data.insert(name.clone(), Value::Object(slice.fields));
        self.actions.insert(name, slice.actions);
        true
    }

    /// Slice names in composition order.
    pub fn slice_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn contains_slice(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All slice data, one member per slice.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Data of one slice.
    pub fn slice(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// One data field of one slice.
    pub fn field(&self, slice: &str, field: &str) -> Option<&Value> {
        self.data.get(slice).and_then(|data| data.get(field))
    }

    /// Look up an action.
    pub fn action(&self, slice: &str, action: &str) -> Option<Action> {
        self.actions
            .get(slice)
            .and_then(|actions| actions.get(action))
            .cloned()
    }

    /// Call an action with positional arguments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use slicestate::core::{ComposedState, Slice};
    /// use serde_json::json;
    ///
    /// let mut state = ComposedState::new();
    /// state.insert_slice("fish", Slice::new().action("double", |args| {
    ///     json!(args[0].as_i64().unwrap_or(0) * 2)
    /// }));
    ///
    /// assert_eq!(state.call("fish", "double", &[json!(21)]), Ok(json!(42)));
    /// assert!(state.call("fish", "missing", &[]).is_err());
    /// ```
    pub fn call(&self, slice: &str, action: &str, args: &[Value]) -> Result<Value, StateError> {
        let actions = self
            .actions
            .get(slice)
            .ok_or_else(|| StateError::UnknownSlice(slice.to_string()))?;
        let action = actions
            .get(action)
            .ok_or_else(|| StateError::UnknownAction {
                slice: slice.to_string(),
                action: action.to_string(),
            })?;
        Ok(action(args))
    }

    /// Swap in new data, keeping the actions.
    pub(crate) fn with_data(&self, data: Map<String, Value>) -> Self {
        Self {
            data,
            actions: self.actions.clone(),
        }
    }
}

impl fmt::Debug for ComposedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedState")
            .field("data", &self.data)
            .field("slices", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_preserves_composition_order() {
        let mut state = ComposedState::new();
        state.insert_slice("zebra", Slice::new());
        state.insert_slice("apple", Slice::new());
        state.insert_slice("mango", Slice::new());

        let names: Vec<_> = state.slice_names().collect();
        assert_eq!(names, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn insert_rejects_existing_name() {
        let mut state = ComposedState::new();
        assert!(state.insert_slice("bear", Slice::new().field("bears", 1)));
        assert!(!state.insert_slice("bear", Slice::new().field("bears", 2)));

        assert_eq!(state.len(), 1);
        assert_eq!(state.field("bear", "bears"), Some(&json!(1)));
    }

    #[test]
    fn action_only_slice_still_has_data_entry() {
        let mut state = ComposedState::new();
        state.insert_slice("shared", Slice::new().command("add_both", || {}));

        assert!(state.contains_slice("shared"));
        assert_eq!(state.slice("shared"), Some(&json!({})));
        assert!(state.action("shared", "add_both").is_some());
    }

    #[test]
    fn call_reports_unknown_slice_and_action() {
        let mut state = ComposedState::new();
        state.insert_slice("bear", Slice::new());

        assert_eq!(
            state.call("fish", "add_fish", &[]),
            Err(StateError::UnknownSlice("fish".into()))
        );
        assert_eq!(
            state.call("bear", "add_bear", &[]),
            Err(StateError::UnknownAction {
                slice: "bear".into(),
                action: "add_bear".into(),
            })
        );
    }

    #[test]
    fn with_data_keeps_actions() {
        let mut state = ComposedState::new();
        state.insert_slice("bear", Slice::new().action("noop", |_| Value::Null));

        let mut data = Map::new();
        data.insert("bear".into(), json!({ "bears": 3 }));
        let next = state.with_data(data);

        assert_eq!(next.field("bear", "bears"), Some(&json!(3)));
        assert!(next.action("bear", "noop").is_some());
    }

    #[test]
    fn from_fields_ignores_non_objects() {
        assert!(Slice::from_fields(json!([1, 2])).fields().is_empty());
        assert_eq!(
            Slice::from_fields(json!({ "fishes": 0 })).fields()["fishes"],
            json!(0)
        );
    }
}
