use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which flavour of archive an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveKind {
    /// Entire source database dump.
    Complete,
    /// Complete dump minus sensitive top-level collections.
    Filtered,
    /// Only the discussion-related collections.
    TalkSubset,
    /// Field-allowlisted per-project export.
    Sanitized,
    /// Independently configured external database.
    Standalone,
    /// Full-fidelity per-project export.
    Project,
    /// Staging database dump.
    Staging,
}

impl ArchiveKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Filtered => "filtered",
            Self::TalkSubset => "talk_subset",
            Self::Sanitized => "sanitized",
            Self::Standalone => "standalone",
            Self::Project => "project",
            Self::Staging => "staging",
        }
    }

    /// Whether the artifact may be linked in the externally shared manifest.
    #[must_use]
    pub const fn is_shareable(&self) -> bool {
        matches!(self, Self::Filtered | Self::TalkSubset)
    }

    /// Whole-database artifacts, listed first in the operator manifest.
    #[must_use]
    pub const fn is_run_level(&self) -> bool {
        matches!(
            self,
            Self::Complete | Self::Filtered | Self::TalkSubset | Self::Staging
        )
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A built archive waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveVariant {
    pub kind: ArchiveKind,
    /// Final location of the `.tar.gz` on local disk.
    pub archive_path: PathBuf,
    /// Object key suffix under the run prefix (e.g. `projects/x.tar.gz`).
    pub relative_key: String,
    /// Human-readable name used in the email line.
    pub display_name: String,
}
