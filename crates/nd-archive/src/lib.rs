//! # nd-archive
//!
//! Builds the `.tar.gz` archives nightdump uploads. The set of files an
//! archive contains is decided by an [`ArchiveFilter`] before anything is
//! written, so selection is testable on its own.

pub mod builder;
pub mod error;
pub mod filter;
pub mod tree;

pub use builder::{ArchiveRequest, BuiltArchive, build_archive, collect_entries};
pub use error::ArchiveError;
pub use filter::{ArchiveFilter, FilePredicate};
pub use tree::{clear_dir, flatten_nested, remove_tree};
