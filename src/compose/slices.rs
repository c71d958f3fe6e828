//! The ordered slice mapping handed to `create_slices`.

use crate::compose::error::CompositionError;
use crate::compose::mutator::SliceMutator;
use crate::compose::options::{ComposeOptions, LabelFallback};
use crate::core::{Slice, SliceName};
use crate::infer::{BacktraceInference, CallerInference};
use crate::store::{BoxError, GetState, Store};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builds one slice from the slice's mutator, the store's `get` and the
/// store handle.
pub type SliceConstructor =
    Arc<dyn Fn(SliceMutator, GetState, Store) -> Result<Slice, BoxError> + Send + Sync>;

/// Slice names mapped to constructors, in insertion order.
///
/// Cloning is cheap, and the same mapping can be composed into any number
/// of independent stores.
#[derive(Clone)]
pub struct Slices {
    pub(crate) entries: Vec<(SliceName, SliceConstructor)>,
    pub(crate) fallback: LabelFallback,
    pub(crate) inference: Arc<dyn CallerInference>,
}

impl Slices {
    pub fn builder() -> SlicesBuilder {
        SlicesBuilder::new()
    }

    /// Slice names in composition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fallback(&self) -> &LabelFallback {
        &self.fallback
    }
}

impl fmt::Debug for Slices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slices")
            .field("names", &self.names().collect::<Vec<_>>())
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Builder for [`Slices`].
///
/// # Example
///
/// ```rust
/// use slicestate::compose::{LabelFallback, Slices};
/// use slicestate::core::Slice;
///
/// let slices = Slices::builder()
///     .slice("bear", |_set, _get, _store| Ok(Slice::new().field("bears", 0)))
///     .slice("fish", |_set, _get, _store| Ok(Slice::new().field("fishes", 0)))
///     .fallback(LabelFallback::Omit)
///     .build()
///     .unwrap();
///
/// assert_eq!(slices.names().collect::<Vec<_>>(), vec!["bear", "fish"]);
/// ```
pub struct SlicesBuilder {
    entries: Vec<(SliceName, SliceConstructor)>,
    fallback: LabelFallback,
    inference: Arc<dyn CallerInference>,
}

impl SlicesBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            fallback: LabelFallback::default(),
            inference: Arc::new(BacktraceInference),
        }
    }

    /// Add a named slice.
    pub fn slice<F>(mut self, name: impl Into<SliceName>, constructor: F) -> Self
    where
        F: Fn(SliceMutator, GetState, Store) -> Result<Slice, BoxError> + Send + Sync + 'static,
    {
        self.entries.push((name.into(), Arc::new(constructor)));
        self
    }

    /// Add a named slice from an already shared constructor.
    pub fn shared_slice(mut self, name: impl Into<SliceName>, constructor: SliceConstructor) -> Self {
        self.entries.push((name.into(), constructor));
        self
    }

    /// Label used when the caller's name cannot be inferred.
    pub fn fallback(mut self, fallback: LabelFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Apply deserialized options.
    pub fn options(self, options: ComposeOptions) -> Self {
        self.fallback(options.fallback)
    }

    /// Replace the backtrace-based caller inference.
    pub fn inference<I>(mut self, inference: I) -> Self
    where
        I: CallerInference + 'static,
    {
        self.inference = Arc::new(inference);
        self
    }

    /// Build the mapping.
    ///
    /// Every duplicated name is reported, not just the first.
    pub fn build(self) -> Result<Slices, CompositionError> {
        let mut seen = HashSet::new();
        let checks: Vec<Validation<(), NonEmptyVec<String>>> = self
            .entries
            .iter()
            .map(|(name, _)| {
                if seen.insert(name.as_str()) {
                    Validation::success(())
                } else {
                    Validation::fail(name.clone())
                }
            })
            .collect();

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(Slices {
                entries: self.entries,
                fallback: self.fallback,
                inference: self.inference,
            }),
            Validation::Failure(duplicates) => {
                let mut names: Vec<String> = Vec::new();
                for name in duplicates.iter() {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
                Err(CompositionError::DuplicateSlices(names))
            }
        }
    }
}

impl Default for SlicesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
