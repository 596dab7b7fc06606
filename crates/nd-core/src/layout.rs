//! On-disk layout of one run's working directory.
//!
//! ```text
//! {root}/
//!   backups/
//!     projects/              sanitized + full per-project archives
//!     standalone_projects/   standalone database archives
//!     {db}_{stamp}*.tar.gz   global archives
//!   project_dumps/{output}/  per-project export scratch space
//!   standalone_dumps/{name}/ standalone dump scratch space
//!   {db}_{stamp}/            global dump scratch space
//! ```
//!
//! Each project writes only below a subtree keyed by its own output basename.

use std::path::{Path, PathBuf};

use crate::stamp::RunStamp;

pub const PROJECTS_DIR: &str = "projects";
pub const STANDALONE_DIR: &str = "standalone_projects";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    #[must_use]
    pub fn project_backups_dir(&self) -> PathBuf {
        self.backups_dir().join(PROJECTS_DIR)
    }

    #[must_use]
    pub fn standalone_backups_dir(&self) -> PathBuf {
        self.backups_dir().join(STANDALONE_DIR)
    }

    #[must_use]
    pub fn project_dumps_dir(&self) -> PathBuf {
        self.root.join("project_dumps")
    }

    #[must_use]
    pub fn standalone_dumps_dir(&self) -> PathBuf {
        self.root.join("standalone_dumps")
    }

    /// Scratch directory for the full dump of `db_name`.
    #[must_use]
    pub fn database_dump_dir(&self, db_name: &str, stamp: RunStamp) -> PathBuf {
        self.root.join(format!("{db_name}_{stamp}"))
    }

    /// Directories that must exist before any phase writes.
    #[must_use]
    pub fn skeleton(&self) -> Vec<PathBuf> {
        vec![
            self.backups_dir(),
            self.project_backups_dir(),
            self.standalone_backups_dir(),
        ]
    }
}
