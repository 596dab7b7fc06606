use nd_archive::ArchiveError;
use nd_core::CoreError;
use nd_mongo::MongoError;
use nd_storage::StorageError;
use thiserror::Error;

/// Why a backup run did not complete cleanly.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No replica set member is safe to read from. Nothing was created.
    #[error("replica selection failed: {0}")]
    Selection(#[source] MongoError),

    /// A dump or export exited non-zero, timed out, or could not start.
    #[error("export failed: {0}")]
    Export(#[from] MongoError),

    #[error("archive failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("upload failed: {0}")]
    Upload(#[from] StorageError),

    /// Every backup was uploaded but some mail was not delivered.
    #[error("{} notification(s) not delivered: {}", failures.len(), failures.join("; "))]
    Notification { failures: Vec<String> },

    #[error("project registry error: {0}")]
    Registry(#[from] CoreError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
