use std::path::PathBuf;

use nd_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry error: {0}")]
    Registry(#[from] CoreError),

    #[error("storage not configured: {0}")]
    NotConfigured(String),

    /// The store refused the object.
    #[error("upload of {key} rejected: {reason}")]
    Rejected { key: String, reason: String },
}
