//! Composition errors.

use crate::store::BoxError;
use thiserror::Error;

/// Errors that can occur when building a slice mapping or composing it.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Duplicate slice names: {}", .0.join(", "))]
    DuplicateSlices(Vec<String>),

    #[error("Slice '{slice}' failed to construct: {source}")]
    SliceFailed {
        slice: String,
        #[source]
        source: BoxError,
    },
}
