//! Labeled action history.
//!
//! Provides immutable tracking of the labeled mutations a store went
//! through, in the order the devtools subscriber observed them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Record of a single labeled mutation.
///
/// # Example
///
/// ```rust
/// use slicestate::core::ActionRecord;
/// use serde_json::json;
/// use chrono::Utc;
///
/// let record = ActionRecord {
///     label: "bear/add_bear".to_string(),
///     state: json!({ "bear": { "bears": 1 } }),
///     replaced: false,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.slice(), Some("bear"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The action label, `"<slice>/<action>"` for slice mutations
    pub label: String,
    /// State data right after the mutation
    pub state: Value,
    /// Whether the mutation replaced the whole state
    pub replaced: bool,
    /// When the mutation was observed
    pub timestamp: DateTime<Utc>,
}

impl ActionRecord {
    /// The slice prefix of a `"<slice>/<action>"` label.
    pub fn slice(&self) -> Option<&str> {
        self.label.split_once('/').map(|(slice, _)| slice)
    }
}

/// Ordered history of labeled mutations.
///
/// History is immutable - `record` returns a new history with the entry
/// appended. Devtools connections hand it out as a snapshot of what they
/// retain; collect records into one with `FromIterator`.
///
/// # Example
///
/// ```rust
/// use slicestate::core::{ActionHistory, ActionRecord};
/// use serde_json::json;
/// use chrono::Utc;
///
/// let history = ActionHistory::new();
/// let history = history.record(ActionRecord {
///     label: "@@INIT".to_string(),
///     state: json!({}),
///     replaced: false,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.labels(), vec!["@@INIT"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActionHistory {
    records: Vec<ActionRecord>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record an entry, returning a new history.
    ///
    /// The existing history is left unchanged.
    pub fn record(&self, record: ActionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Labels in the order they were recorded.
    pub fn labels(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.label.as_str()).collect()
    }

    /// Time between the first and the last record.
    ///
    /// Returns `None` for an empty history.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&ActionRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ActionRecord> for ActionHistory {
    fn from_iter<I: IntoIterator<Item = ActionRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
