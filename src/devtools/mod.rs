//! Devtools subscriber.
//!
//! `devtools` wraps a state creator the way a debugging middleware does: it
//! registers a [`Devtools`] connection on the store under [`MARKER`] (the
//! capability slice composition probes for) and records every mutation that
//! passes through `set` together with its action label. Only the latest
//! `max_age` records are retained.

mod error;

pub use error::DevtoolsError;

use crate::core::{ActionHistory, ActionRecord, ComposedState, MutationEnvelope};
use crate::store::{SetState, StateCreator, Store};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Capability marker registered on the store while devtools are attached.
pub const MARKER: &str = "devtools";

/// Label recorded for the initial state.
pub const INIT_ACTION: &str = "@@INIT";

/// Version identifier for the export format
pub const EXPORT_VERSION: u32 = 1;

/// Default number of records a connection keeps.
pub const DEFAULT_MAX_AGE: usize = 50;

/// Devtools configuration.
///
/// # Example
///
/// ```rust
/// use slicestate::devtools::DevtoolsOptions;
///
/// let options: DevtoolsOptions =
///     serde_json::from_str(r#"{ "name": "Example Store" }"#).unwrap();
/// assert!(options.enabled);
/// assert_eq!(options.anonymous_action_type, "anonymous");
/// assert_eq!(options.max_age, 50);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevtoolsOptions {
    /// Display name of the store instance
    pub name: Option<String>,
    /// When false, the creator is returned unwrapped
    pub enabled: bool,
    /// Label recorded for mutations that carry none
    pub anonymous_action_type: String,
    /// Records kept per connection; the oldest are dropped first
    pub max_age: usize,
}

impl Default for DevtoolsOptions {
    fn default() -> Self {
        Self {
            name: None,
            enabled: true,
            anonymous_action_type: "anonymous".to_string(),
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl DevtoolsOptions {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn anonymous_action_type(mut self, label: impl Into<String>) -> Self {
        self.anonymous_action_type = label.into();
        self
    }

    pub fn max_age(mut self, max_age: usize) -> Self {
        self.max_age = max_age;
        self
    }
}

/// Serializable snapshot of a devtools connection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DevtoolsExport {
    /// Export format version
    pub version: u32,
    /// Connection identifier
    pub id: Uuid,
    /// Store display name
    pub name: Option<String>,
    /// When the export was taken
    pub exported_at: DateTime<Utc>,
    /// Every recorded action
    pub history: ActionHistory,
}

impl DevtoolsExport {
    /// Parse an export produced by [`Devtools::export_json`].
    pub fn from_json(json: &str) -> Result<Self, DevtoolsError> {
        let export: Self = serde_json::from_str(json).map_err(DevtoolsError::MalformedExport)?;
        if export.version != EXPORT_VERSION {
            return Err(DevtoolsError::UnsupportedVersion {
                found: export.version,
                supported: EXPORT_VERSION,
            });
        }
        Ok(export)
    }
}

/// A devtools connection recording labeled actions for one store.
///
/// Keeps at most `max_age` records (at least one).
#[derive(Debug)]
pub struct Devtools {
    id: Uuid,
    name: Option<String>,
    anonymous: String,
    max_age: usize,
    records: Mutex<VecDeque<ActionRecord>>,
}

impl Devtools {
    fn new(options: &DevtoolsOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: options.name.clone(),
            anonymous: options.anonymous_action_type.clone(),
            max_age: options.max_age.max(1),
            records: Mutex::new(VecDeque::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Snapshot of the retained records.
    pub fn history(&self) -> ActionHistory {
        self.records.lock().iter().cloned().collect()
    }

    /// Retained labels, oldest first.
    pub fn labels(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.label.clone()).collect()
    }

    /// Serialize the connection and its history to JSON.
    pub fn export_json(&self) -> Result<String, DevtoolsError> {
        let export = DevtoolsExport {
            version: EXPORT_VERSION,
            id: self.id,
            name: self.name.clone(),
            exported_at: Utc::now(),
            history: self.history(),
        };
        serde_json::to_string(&export).map_err(DevtoolsError::EncodeHistory)
    }

    fn record(&self, label: Option<String>, replaced: bool, state: &ComposedState) {
        let label = label.unwrap_or_else(|| self.anonymous.clone());
        trace!(id = %self.id, label = %label, "devtools action");
        let record = ActionRecord {
            label,
            state: Value::Object(state.data().clone()),
            replaced,
            timestamp: Utc::now(),
        };
        let mut records = self.records.lock();
        if records.len() == self.max_age {
            records.pop_front();
        }
        records.push_back(record);
    }
}

/// The devtools connection attached to `store`, if any.
pub fn connection(store: &Store) -> Option<Arc<Devtools>> {
    store.extension::<Devtools>(MARKER)
}

/// Wrap `creator` with a recording devtools subscriber.
///
/// # Example
///
/// ```rust
/// use slicestate::compose::{create_slices, Slices};
/// use slicestate::core::Slice;
/// use slicestate::devtools::{self, DevtoolsOptions};
/// use slicestate::store::Store;
///
/// let slices = Slices::builder()
///     .slice("bear", |_set, _get, _store| Ok(Slice::new().field("bears", 0)))
///     .build()
///     .unwrap();
///
/// let store = Store::create(devtools::devtools(
///     create_slices(slices),
///     DevtoolsOptions::default().named("Example Store"),
/// ))
/// .unwrap();
///
/// let connection = devtools::connection(&store).unwrap();
/// assert_eq!(connection.labels(), vec!["@@INIT".to_string()]);
/// ```
pub fn devtools(creator: StateCreator, options: DevtoolsOptions) -> StateCreator {
    if !options.enabled {
        return creator;
    }
    Box::new(move |set, get, store| {
        let connection = Arc::new(Devtools::new(&options));
        store.insert_extension(MARKER, connection.clone());

        let recorder = Arc::clone(&connection);
        let read = Arc::clone(&get);
        let recording_set: SetState = Arc::new(move |envelope: MutationEnvelope| {
            let label = envelope.label.clone().filter(|label| !label.is_empty());
            let replaced = envelope.replace;
            set(envelope);
            recorder.record(label, replaced, &read());
        });

        let state = creator(recording_set, get, store)?;
        connection.record(Some(INIT_ACTION.to_string()), false, &state);
        debug!(
            id = %connection.id,
            name = connection.name().unwrap_or_default(),
            max_age = connection.max_age,
            "devtools connected"
        );
        Ok(state)
    })
}
