//! Labeling options for composed slices.

use serde::{Deserialize, Serialize};

/// Sentinel used by [`LabelFallback::default`].
pub const UNKNOWN_ACTION: &str = "unknown action";

/// What to label a mutation with when the caller's name cannot be inferred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFallback {
    /// Leave the label unset so the subscriber's own default applies
    Omit,
    /// Use `"<slice>/<sentinel>"`
    Sentinel(String),
}

impl LabelFallback {
    /// The label for `slice` when no caller name is available.
    pub fn label_for(&self, slice: &str) -> Option<String> {
        match self {
            Self::Omit => None,
            Self::Sentinel(sentinel) => Some(format!("{slice}/{sentinel}")),
        }
    }
}

impl Default for LabelFallback {
    fn default() -> Self {
        Self::Sentinel(UNKNOWN_ACTION.to_string())
    }
}

/// Serializable composition options.
///
/// # Example
///
/// ```rust
/// use slicestate::compose::{ComposeOptions, LabelFallback};
///
/// let options: ComposeOptions = serde_json::from_str(r#"{ "fallback": "omit" }"#).unwrap();
/// assert_eq!(options.fallback, LabelFallback::Omit);
///
/// let options: ComposeOptions = serde_json::from_str("{}").unwrap();
/// assert_eq!(options.fallback, LabelFallback::default());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    pub fallback: LabelFallback,
}
