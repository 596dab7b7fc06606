//! # nd-storage
//!
//! Uploads finished archives to object storage with server-side encryption,
//! signs time-limited download links, and turns each upload into the manifest
//! line that ends up in notification mail.

pub mod error;
pub mod store;
pub mod upload;

pub use error::StorageError;
pub use store::{ArtifactStore, Encryption, MemoryArtifactStore, S3ArtifactStore, StoredArtifact};
pub use upload::{Uploader, describe, format_mebibytes};
