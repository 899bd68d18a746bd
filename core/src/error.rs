use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the ingestion and query pipeline.
///
/// A locator, parser or normalizer failure aborts the current ingestion
/// cycle only; the previously ingested snapshots stay authoritative until a
/// later cycle succeeds. Storage failures propagate to the caller instead of
/// degrading into an empty report.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No account-state file exists under the resolved profile directory.
    #[error("no account-state file found under {}", dir.display())]
    NotFound { dir: PathBuf },

    /// The profile root holds several profiles and none is configured.
    #[error("cannot pick a profile under {} (candidates: {}); set `profile` in the config", root.display(), candidates.join(", "))]
    AmbiguousProfile {
        root: PathBuf,
        candidates: Vec<String>,
    },

    /// The state file's container framing or encoding is structurally broken.
    #[error("malformed account state: {reason}")]
    MalformedState { reason: String },

    /// A required field is missing or carries the wrong primitive type.
    #[error("schema violation at `{path}`: {reason}")]
    SchemaViolation { path: String, reason: String },

    /// The snapshot store cannot be reached or a query failed.
    #[error("snapshot store unavailable: {source}")]
    StorageUnavailable {
        #[from]
        source: rusqlite::Error,
    },

    /// A snapshot payload failed to encode or decode.
    #[error("snapshot payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// The configuration file exists but cannot be parsed or written.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The filesystem watcher could not be set up or reported a failure.
    #[error("file watcher error: {reason}")]
    Watch { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedState {
            reason: reason.into(),
        }
    }

    pub fn schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
