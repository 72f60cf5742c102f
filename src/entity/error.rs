//! Entity source error types

use std::path::PathBuf;
use thiserror::Error;

use crate::entity::EntityKind;

/// Errors raised while listing or inspecting entities
#[derive(Error, Debug)]
pub enum SourceError {
    /// The snapshot could not be read
    #[error("Failed to read snapshot {path:?}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// The snapshot is not valid JSON or has the wrong shape
    #[error("Invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Inspect was asked for an entity the source does not know
    #[error("Error while retrieving {kind} {id}: not found")]
    NotFound { kind: EntityKind, id: String },
}

/// Result type alias for source operations
pub type SourceResult<T> = Result<T, SourceError>;
