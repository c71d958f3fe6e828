//! The per-slice instrumented mutator.

use crate::compose::options::LabelFallback;
use crate::core::{MutationEnvelope, SliceName, Update};
use crate::infer::CallerInference;
use crate::store::SetState;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Labeling policy shared by every mutator of one composition.
pub(crate) struct Labeling {
    pub(crate) devtools: bool,
    pub(crate) fallback: LabelFallback,
    pub(crate) inference: Arc<dyn CallerInference>,
}

/// `set` bound to one slice.
///
/// Forwards every mutation to the store's `set` unchanged, except that when
/// devtools are attached and no label was given it fills in
/// `"<slice>/<caller>"`. Explicit labels are never rewritten.
#[derive(Clone)]
pub struct SliceMutator {
    slice: SliceName,
    labeling: Arc<Labeling>,
    set: SetState,
}

impl SliceMutator {
    pub(crate) fn new(slice: SliceName, labeling: Arc<Labeling>, set: SetState) -> Self {
        Self {
            slice,
            labeling,
            set,
        }
    }

    /// The slice this mutator belongs to.
    pub fn slice(&self) -> &str {
        &self.slice
    }

    /// Whether labels are being inferred for this slice.
    pub fn devtools_attached(&self) -> bool {
        self.labeling.devtools
    }

    /// Merge a partial update.
    pub fn set(&self, update: impl Into<Update>) {
        self.call(MutationEnvelope::new(update));
    }

    /// Replace the whole state.
    pub fn replace(&self, update: impl Into<Update>) {
        self.call(MutationEnvelope::new(update).replacing());
    }

    /// Merge a partial update under an explicit label.
    pub fn set_labeled(&self, update: impl Into<Update>, label: impl Into<String>) {
        self.call(MutationEnvelope::new(update).labeled(label));
    }

    /// Forward a full envelope.
    #[inline(never)]
    pub fn call(&self, envelope: MutationEnvelope) {
        let envelope = self.label(envelope);
        (self.set)(envelope);
    }

    #[inline(never)]
    fn label(&self, mut envelope: MutationEnvelope) -> MutationEnvelope {
        if !self.labeling.devtools || envelope.has_label() {
            return envelope;
        }
        envelope.label = match self.labeling.inference.caller_name() {
            Some(name) => Some(format!("{}/{}", self.slice, name)),
            None => self.labeling.fallback.label_for(&self.slice),
        };
        trace!(
            slice = %self.slice,
            label = envelope.label.as_deref().unwrap_or_default(),
            "labeled slice mutation"
        );
        envelope
    }
}

impl fmt::Debug for SliceMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceMutator")
            .field("slice", &self.slice)
            .field("devtools", &self.labeling.devtools)
            .field("fallback", &self.labeling.fallback)
            .finish()
    }
}
