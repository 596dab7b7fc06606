//! # nd-core
//!
//! Core types shared across all nightdump crates:
//! - Project records and archive variants
//! - The run stamp and the injectable clock that produces it
//! - The on-disk layout of a run's working directory
//! - The mutex-guarded project registry written by concurrent uploads
//! - Rails-compatible name inflection used for collection names and titles
//! - The fixed privacy lists that define what sanitized exports may contain
//! - Cross-cutting error types

pub mod context;
pub mod entities;
pub mod errors;
pub mod inflect;
pub mod layout;
pub mod privacy;
pub mod registry;
pub mod stamp;

pub use context::RunContext;
pub use entities::{ArchiveKind, ArchiveVariant, Project};
pub use errors::CoreError;
pub use layout::RunLayout;
pub use registry::ProjectRegistry;
pub use stamp::{Clock, FixedClock, RunStamp, SystemClock};
