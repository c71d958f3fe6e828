//! Slice composition.
//!
//! `create_slices` turns an ordered mapping of slice constructors into one
//! state creator. Each slice's data and actions end up under the slice name,
//! and each slice gets its own [`SliceMutator`] that labels unlabeled
//! mutations `"<slice>/<caller>"` while devtools are attached.

pub mod error;
pub mod macros;
pub mod mutator;
pub mod options;
pub mod slices;

pub use error::CompositionError;
pub use mutator::SliceMutator;
pub use options::{ComposeOptions, LabelFallback, UNKNOWN_ACTION};
pub use slices::{SliceConstructor, Slices, SlicesBuilder};

use crate::core::ComposedState;
use crate::devtools;
use crate::store::{GetState, SetState, StateCreator, Store};
use mutator::Labeling;
use std::sync::Arc;
use tracing::{debug, warn};

/// Whether an observability subscriber is attached to `store`.
///
/// Best-effort and fail-open: anything short of a readable devtools marker
/// counts as "not attached".
pub fn subscriber_attached(store: &Store) -> bool {
    store.has_capability(devtools::MARKER)
}

/// Combine slices into a single state creator.
///
/// The devtools probe runs once per store construction. Slice constructors
/// run in mapping order; the first failure aborts the whole composition.
///
/// # Example
///
/// ```rust
/// use slicestate::compose::{create_slices, Slices};
/// use slicestate::core::{Slice, Update};
/// use slicestate::store::Store;
/// use serde_json::json;
///
/// let slices = Slices::builder()
///     .slice("bear", |set, _get, _store| {
///         Ok(Slice::new().field("bears", 0).command("add_bear", move || {
///             set.set(Update::draft(|s| {
///                 let bears = s["bear"]["bears"].as_i64().unwrap_or(0);
///                 s["bear"]["bears"] = json!(bears + 1);
///             }));
///         }))
///     })
///     .build()
///     .unwrap();
///
/// let store = Store::create(create_slices(slices)).unwrap();
/// store.dispatch("bear", "add_bear", &[]).unwrap();
/// assert_eq!(store.get_state().field("bear", "bears"), Some(&json!(1)));
/// ```
pub fn create_slices(slices: Slices) -> StateCreator {
    Box::new(move |set, get, store| Ok(compose(&slices, set, get, &store)?))
}

fn compose(
    slices: &Slices,
    set: SetState,
    get: GetState,
    store: &Store,
) -> Result<ComposedState, CompositionError> {
    let labeling = Arc::new(Labeling {
        devtools: subscriber_attached(store),
        fallback: slices.fallback.clone(),
        inference: Arc::clone(&slices.inference),
    });
    debug!(
        slices = slices.len(),
        devtools = labeling.devtools,
        "composing slices"
    );

    let mut state = ComposedState::new();
    for (name, constructor) in &slices.entries {
        let mutator = SliceMutator::new(name.clone(), Arc::clone(&labeling), Arc::clone(&set));
        let slice = constructor(mutator, Arc::clone(&get), store.clone()).map_err(|source| {
            warn!(slice = %name, error = %source, "slice constructor failed");
            CompositionError::SliceFailed {
                slice: name.clone(),
                source,
            }
        })?;
        state.insert_slice(name.clone(), slice);
    }
    Ok(state)
}
