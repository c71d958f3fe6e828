//! Slicestate: slice composition for synchronous state stores
//!
//! Slicestate organizes a store into independently written slices. Each
//! slice's data and actions are nested under the slice's name, and every
//! mutation a slice makes is labeled `"<slice>/<function>"` for an attached
//! devtools subscriber.
//!
//! # Core Concepts
//!
//! - **Slices**: named constructors producing data fields and actions
//! - **Composition**: `create_slices` merges slices into one state creator
//! - **Instrumented mutators**: per-slice `set` wrappers that fill in action
//!   labels, inferred from the call stack, only when devtools are attached
//! - **Store**: the synchronous engine slices are written against
//!
//! # Example
//!
//! ```rust
//! use slicestate::compose::{create_slices, Slices};
//! use slicestate::core::{Slice, Update};
//! use slicestate::devtools::{self, DevtoolsOptions};
//! use slicestate::store::Store;
//! use serde_json::json;
//!
//! let slices = Slices::builder()
//!     .slice("bear", |set, _get, _store| {
//!         Ok(Slice::new().field("bears", 0).command("add_bear", move || {
//!             set.set_labeled(
//!                 Update::draft(|s| {
//!                     let bears = s["bear"]["bears"].as_i64().unwrap_or(0);
//!                     s["bear"]["bears"] = json!(bears + 1);
//!                 }),
//!                 "bear/add_bear",
//!             );
//!         }))
//!     })
//!     .slice("fish", |_set, _get, _store| Ok(Slice::new().field("fishes", 0)))
//!     .build()
//!     .unwrap();
//!
//! let store = Store::create(devtools::devtools(
//!     create_slices(slices),
//!     DevtoolsOptions::default().named("Example Store"),
//! ))
//! .unwrap();
//!
//! store.dispatch("bear", "add_bear", &[]).unwrap();
//!
//! assert_eq!(store.get_state().field("bear", "bears"), Some(&json!(1)));
//! let labels = devtools::connection(&store).unwrap().labels();
//! assert_eq!(labels, vec!["@@INIT", "bear/add_bear"]);
//! ```

pub mod compose;
pub mod core;
pub mod devtools;
pub mod infer;
pub mod store;

// Re-export commonly used types
pub use compose::{create_slices, LabelFallback, SliceMutator, Slices};
pub use core::{ComposedState, MutationEnvelope, Slice, Update};
pub use store::{GetState, SetState, StateCreator, Store};
