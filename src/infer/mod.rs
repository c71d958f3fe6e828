//! Best-effort recovery of the function that invoked a slice mutator.
//!
//! The name only ever ends up in a devtools action label. A missing or wrong
//! name never changes how a mutation is applied.
//!
//! # Limitations
//!
//! Inference reads symbol names from a captured backtrace, so it needs debug
//! symbols and frames that were not inlined away. Optimized builds commonly
//! report `None`; pass an explicit label where a stable name matters.

mod stack;

pub use stack::{caller_name_from_stack, frames, Frame};

use std::backtrace::Backtrace;

/// Marker the parser looks for to locate the inferencer's own frame.
pub const MARKER: &str = "infer_caller_name";

/// Source of caller names for unlabeled mutations.
///
/// `None` means "unknown"; callers must treat it as a normal outcome.
pub trait CallerInference: Send + Sync {
    fn caller_name(&self) -> Option<String>;
}

/// Infers names by parsing the current backtrace.
#[derive(Clone, Copy, Debug, Default)]
pub struct BacktraceInference;

impl CallerInference for BacktraceInference {
    fn caller_name(&self) -> Option<String> {
        infer_caller_name()
    }
}

/// Always reports the same name. Useful for deterministic labels in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedInference(pub Option<String>);

impl FixedInference {
    pub fn named(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    pub fn unknown() -> Self {
        Self(None)
    }
}

impl CallerInference for FixedInference {
    fn caller_name(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Capture the current stack and recover the mutator caller's name.
///
/// Must be called from within the mutator wrapper: the frame directly above
/// this one is treated as the mutator and skipped.
#[inline(never)]
pub fn infer_caller_name() -> Option<String> {
    let stack = Backtrace::force_capture().to_string();
    caller_name_from_stack(&stack, MARKER)
}
