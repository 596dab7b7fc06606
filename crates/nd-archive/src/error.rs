use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// The filter left no files to archive.
    #[error("nothing to archive in {0}")]
    Empty(PathBuf),

    #[error("not an archivable directory: {0}")]
    InvalidSource(PathBuf),
}

impl ArchiveError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}
