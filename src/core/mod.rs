//! Core data types shared by the composer, the store and devtools.
//!
//! - Slices and the composed state they nest into
//! - Update forms and the mutation envelope passed to `set`
//! - Immutable history of labeled actions

mod history;
mod state;
mod update;

pub use history::{ActionHistory, ActionRecord};
pub use state::{Action, ComposedState, Slice, SliceName, StateError};
pub use update::{MutationEnvelope, Update};
