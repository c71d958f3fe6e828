//! Store error types.

use crate::core::StateError;
use thiserror::Error;

/// Boxed error returned by state creators and slice constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when creating or driving a store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The state creator failed; no store was created
    #[error("Store construction failed: {0}")]
    Construction(#[source] BoxError),

    /// An action lookup on the current state failed
    #[error(transparent)]
    State(#[from] StateError),
}
