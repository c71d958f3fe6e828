//! Devtools error types.

use thiserror::Error;

/// Errors raised while exporting or reading back recorded history
#[derive(Debug, Error)]
pub enum DevtoolsError {
    /// The retained history could not be encoded as JSON
    #[error("Could not encode devtools history: {0}")]
    EncodeHistory(#[source] serde_json::Error),

    /// The input is not a devtools export
    #[error("Malformed devtools export: {0}")]
    MalformedExport(#[source] serde_json::Error),

    /// The export was written by an incompatible format revision
    #[error("Devtools export format v{found} cannot be read, expected v{supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
