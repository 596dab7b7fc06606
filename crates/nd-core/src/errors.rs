//! Cross-cutting error types for nightdump.
//!
//! Domain-specific errors (e.g., `MongoError`, `ArchiveError`) are defined in
//! their respective crates. The orchestrator in `nd-cli` maps all of them onto
//! its phase-level `PipelineError`.

use thiserror::Error;

/// Errors that can be raised by any nightdump crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Project lookup returned no result.
    #[error("Project not found in registry: {id}")]
    NotFound { id: String },

    /// A project with the same id is already registered for this run.
    #[error("Project {id} is already registered")]
    DuplicateId { id: String },

    /// Two projects would share an output basename (same name within one run).
    #[error("Projects {existing} and {id} share output basename '{output}'")]
    DuplicateOutput {
        id: String,
        existing: String,
        output: String,
    },

    /// An email line was written twice before being consumed.
    #[error("Email line for project {id} was already recorded")]
    AlreadyRecorded { id: String },

    /// The registry mutex was poisoned by a panicking writer.
    #[error("Project registry lock poisoned")]
    LockPoisoned,
}
