//! A small synchronous state store.
//!
//! The store owns the composed state after construction. It exposes the
//! construction protocol slices are written against: a state creator is
//! handed `(set, get, store)` once, and every later mutation goes through
//! `set`.
//!
//! # Example
//!
//! ```rust
//! use slicestate::core::{ComposedState, MutationEnvelope, Slice};
//! use slicestate::store::Store;
//! use serde_json::json;
//!
//! let store = Store::create(Box::new(|_set, _get, _store| {
//!     let mut state = ComposedState::new();
//!     state.insert_slice("counter", Slice::new().field("value", 0));
//!     Ok(state)
//! }))
//! .unwrap();
//!
//! store.set_state(MutationEnvelope::new(json!({ "counter": { "value": 5 } })));
//! assert_eq!(store.get_state().field("counter", "value"), Some(&json!(5)));
//! ```

mod error;

pub use error::{BoxError, StoreError};

use crate::core::{ComposedState, MutationEnvelope};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// The raw mutation primitive.
pub type SetState = Arc<dyn Fn(MutationEnvelope) + Send + Sync>;

/// Reads the current state.
pub type GetState = Arc<dyn Fn() -> ComposedState + Send + Sync>;

/// Builds the initial state, once, when the store is created.
pub type StateCreator =
    Box<dyn FnOnce(SetState, GetState, Store) -> Result<ComposedState, BoxError> + Send>;

/// Called with `(next, previous)` after every state change.
pub type Listener = Arc<dyn Fn(&ComposedState, &ComposedState) + Send + Sync>;

/// Handle returned by [`Store::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Inner {
    state: RwLock<ComposedState>,
    // Serializes read-apply-store in `set_state`.
    writer: Mutex<()>,
    initial: RwLock<ComposedState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_listener: AtomicU64,
    extensions: RwLock<BTreeMap<String, Arc<dyn Any + Send + Sync>>>,
}

/// Shared handle to a store.
///
/// Clones refer to the same store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    /// Create a store by running `creator` once.
    ///
    /// `get` returns an empty state until the creator has returned. A
    /// failing creator aborts construction and no store is produced.
    pub fn create(creator: StateCreator) -> Result<Self, StoreError> {
        let store = Self {
            inner: Arc::new(Inner::default()),
        };

        let state = creator(store.setter(), store.getter(), store.clone())
            .map_err(StoreError::Construction)?;

        debug!(
            slices = state.len(),
            extensions = store.inner.extensions.read().len(),
            "store created"
        );
        *store.inner.initial.write() = state.clone();
        *store.inner.state.write() = state;
        Ok(store)
    }

    /// Current state.
    pub fn get_state(&self) -> ComposedState {
        self.inner.state.read().clone()
    }

    /// State as it was right after construction.
    pub fn get_initial_state(&self) -> ComposedState {
        self.inner.initial.read().clone()
    }

    /// Apply a mutation and notify listeners when the data changed.
    ///
    /// Concurrent calls are applied one at a time, each against the result
    /// of the previous one. Updaters may read the store but must not call
    /// `set_state` themselves; listeners run after the write and may. The
    /// label is only traced; recording it is up to an attached devtools
    /// subscriber.
    pub fn set_state(&self, envelope: MutationEnvelope) {
        let MutationEnvelope {
            update,
            replace,
            label,
        } = envelope;
        let label = label.unwrap_or_default();

        let (next, previous) = {
            let _writer = self.inner.writer.lock();
            let previous = self.get_state();
            let data = update.apply(previous.data(), replace);
            if &data == previous.data() {
                trace!(label = %label, "state unchanged");
                return;
            }
            let next = previous.with_data(data);
            *self.inner.state.write() = next.clone();
            (next, previous)
        };
        trace!(label = %label, replace, "state updated");

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&next, &previous);
        }
    }

    /// Register a listener for state changes.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ComposedState, &ComposedState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Call an action of the current state.
    pub fn dispatch(&self, slice: &str, action: &str, args: &[Value]) -> Result<Value, StoreError> {
        let state = self.get_state();
        Ok(state.call(slice, action, args)?)
    }

    /// Attach a middleware extension under `marker`, replacing any previous one.
    pub fn insert_extension(&self, marker: impl Into<String>, extension: Arc<dyn Any + Send + Sync>) {
        self.inner.extensions.write().insert(marker.into(), extension);
    }

    /// The extension registered under `marker`, if it has type `T`.
    pub fn extension<T: Any + Send + Sync>(&self, marker: &str) -> Option<Arc<T>> {
        let extension = self.inner.extensions.read().get(marker).cloned()?;
        extension.downcast::<T>().ok()
    }

    /// Whether a middleware registered `marker`.
    ///
    /// Fails open: an unreadable registry reports `false`.
    pub fn has_capability(&self, marker: &str) -> bool {
        self.inner
            .extensions
            .try_read()
            .is_some_and(|extensions| extensions.contains_key(marker))
    }

    fn setter(&self) -> SetState {
        let inner = Arc::downgrade(&self.inner);
        Arc::new(move |envelope| {
            if let Some(store) = upgrade(&inner) {
                store.set_state(envelope);
            }
        })
    }

    fn getter(&self) -> GetState {
        let inner = Arc::downgrade(&self.inner);
        Arc::new(move || upgrade(&inner).map(|store| store.get_state()).unwrap_or_default())
    }
}

fn upgrade(inner: &Weak<Inner>) -> Option<Store> {
    inner.upgrade().map(|inner| Store { inner })
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.read())
            .field("listeners", &self.inner.listeners.lock().len())
            .field("extensions", &self.inner.extensions.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Slice, Update};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn counter_store() -> Store {
        Store::create(Box::new(|set, _get, _store| {
            let mut state = ComposedState::new();
            state.insert_slice(
                "counter",
                Slice::new().field("value", 0).command("increment", move || {
                    set(MutationEnvelope::new(Update::draft(|s| {
                        let value = s["counter"]["value"].as_i64().unwrap_or(0);
                        s["counter"]["value"] = json!(value + 1);
                    })))
                }),
            );
            Ok(state)
        }))
        .unwrap()
    }

    #[test]
    fn creator_result_becomes_current_and_initial_state() {
        let store = counter_store();

        assert_eq!(store.get_state().field("counter", "value"), Some(&json!(0)));
        assert_eq!(store.get_initial_state().field("counter", "value"), Some(&json!(0)));
    }

    #[test]
    fn failing_creator_aborts_construction() {
        let result = Store::create(Box::new(|_, _, _| Err("no state".into())));

        let err = result.unwrap_err();
        assert!(matches!(err, StoreError::Construction(_)));
        assert!(err.to_string().contains("no state"));
    }

    #[test]
    fn get_during_construction_is_empty() {
        let seen = Arc::new(AtomicUsize::new(usize::MAX));
        let seen_in_creator = Arc::clone(&seen);

        Store::create(Box::new(move |_set, get, _store| {
            seen_in_creator.store(get().len(), Ordering::SeqCst);
            Ok(ComposedState::new())
        }))
        .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatch_runs_actions_on_current_state() {
        let store = counter_store();

        store.dispatch("counter", "increment", &[]).unwrap();
        store.dispatch("counter", "increment", &[]).unwrap();

        assert_eq!(store.get_state().field("counter", "value"), Some(&json!(2)));
        assert_eq!(store.get_initial_state().field("counter", "value"), Some(&json!(0)));
    }

    #[test]
    fn dispatch_reports_unknown_action() {
        let store = counter_store();

        let err = store.dispatch("counter", "decrement", &[]).unwrap_err();
        assert!(matches!(err, StoreError::State(_)));
    }

    #[test]
    fn listeners_see_next_and_previous() {
        let store = counter_store();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let calls_in_listener = Arc::clone(&calls);

        store.subscribe(move |next, previous| {
            calls_in_listener.lock().push((
                previous.field("counter", "value").cloned(),
                next.field("counter", "value").cloned(),
            ));
        });
        store.dispatch("counter", "increment", &[]).unwrap();

        assert_eq!(*calls.lock(), vec![(Some(json!(0)), Some(json!(1)))]);
    }

    #[test]
    fn unchanged_state_does_not_notify() {
        let store = counter_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_listener = Arc::clone(&calls);
        store.subscribe(move |_, _| {
            calls_in_listener.fetch_add(1, Ordering::SeqCst);
        });

        store.set_state(MutationEnvelope::new(json!({ "counter": { "value": 0 } })));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = counter_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_listener = Arc::clone(&calls);
        let id = store.subscribe(move |_, _| {
            calls_in_listener.fetch_add(1, Ordering::SeqCst);
        });

        store.dispatch("counter", "increment", &[]).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch("counter", "increment", &[]).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn replace_keeps_actions() {
        let store = counter_store();

        store.set_state(MutationEnvelope::new(json!({ "counter": { "value": 9 } })).replacing());
        store.dispatch("counter", "increment", &[]).unwrap();

        assert_eq!(store.get_state().field("counter", "value"), Some(&json!(10)));
    }

    #[test]
    fn concurrent_dispatches_are_not_lost() {
        let store = counter_store();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        store.dispatch("counter", "increment", &[]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get_state().field("counter", "value"), Some(&json!(2000)));
    }

    #[test]
    fn listeners_may_set_state() {
        let store = counter_store();
        let inner = store.clone();
        store.subscribe(move |next, _| {
            if next.field("counter", "value") == Some(&json!(1)) {
                inner.set_state(MutationEnvelope::new(json!({ "counter": { "value": 10 } })));
            }
        });

        store.dispatch("counter", "increment", &[]).unwrap();

        assert_eq!(store.get_state().field("counter", "value"), Some(&json!(10)));
    }

    #[test]
    fn any_marker_registered_during_construction_is_visible() {
        let store = Store::create(Box::new(|_set, _get, store| {
            store.insert_extension("inspector", Arc::new("attached"));
            Ok(ComposedState::new())
        }))
        .unwrap();

        assert!(store.has_capability("inspector"));
        assert!(!store.has_capability("devtools"));
        assert_eq!(store.extension::<&str>("inspector").as_deref(), Some(&"attached"));
    }

    #[test]
    fn extensions_are_typed_capabilities() {
        let store = counter_store();
        assert!(!store.has_capability("devtools"));

        store.insert_extension("devtools", Arc::new(7_u32));

        assert!(store.has_capability("devtools"));
        assert_eq!(store.extension::<u32>("devtools").as_deref(), Some(&7));
        assert!(store.extension::<String>("devtools").is_none());
    }
}
