//! Entity structs for the records a backup run tracks.

mod archive;
mod project;

pub use archive::{ArchiveKind, ArchiveVariant};
pub use project::Project;
