//! Error types for model resolution

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("invalid DTMI format '{0}'")]
    InvalidDtmiFormat(String),

    #[error("invalid repository location '{location}': {reason}")]
    InvalidRepositoryLocation { location: String, reason: String },

    #[error("local repository directory '{}' not found or not accessible", .path.display())]
    RepositoryNotFound { path: PathBuf },

    #[error("model file '{}' not found or not accessible in local repository", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("model URI '{url}' not accessible in remote repository: {reason}")]
    RemoteFetchFailure { url: String, reason: String },

    #[error("model content does not declare a root @id")]
    MissingRootId,

    #[error("retrieved model content has incorrect root @id: expected '{expected}', parsed '{parsed}'")]
    MismatchedRootId { expected: String, parsed: String },

    #[error("expanded model document is not a JSON array of models")]
    MalformedExpandedDocument,

    #[error("resolution cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolverError {
    /// A miss for one fetch candidate, eligible for expanded-to-plain fallback.
    pub fn is_fetch_miss(&self) -> bool {
        matches!(
            self,
            ResolverError::FileNotFound { .. } | ResolverError::RemoteFetchFailure { .. }
        )
    }
}
