//! Upload an archive, sign a link to it, describe it in one line.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use nd_core::{ProjectRegistry, RunStamp};

use crate::error::StorageError;
use crate::store::{ArtifactStore, Encryption};

const MEBIBYTE: f64 = 1_048_576.0;

/// Size in MiB with three decimals: `1048576` -> `"1.000"`.
#[allow(clippy::cast_precision_loss)]
pub fn format_mebibytes(bytes: u64) -> String {
    format!("{:.3}", bytes as f64 / MEBIBYTE)
}

/// The manifest line for one uploaded artifact.
pub fn describe(display_name: &str, bytes: u64, url: &str) -> String {
    format!(
        "Backed up {display_name} ({} MB) ({url})",
        format_mebibytes(bytes)
    )
}

/// Uploads run artifacts under `{prefix}{stamp}/` and produces manifest lines.
pub struct Uploader {
    store: Arc<dyn ArtifactStore>,
    prefix: String,
    stamp: RunStamp,
    expiry: Duration,
    registry: Arc<ProjectRegistry>,
}

impl Uploader {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        prefix: impl Into<String>,
        stamp: RunStamp,
        expiry: Duration,
        registry: Arc<ProjectRegistry>,
    ) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            stamp,
            expiry,
            registry,
        }
    }

    pub fn object_key(&self, relative: &str) -> String {
        format!("{}{}/{relative}", self.prefix, self.stamp)
    }

    /// Upload `file` encrypted at rest and return its manifest line.
    pub async fn upload(
        &self,
        display_name: &str,
        relative: &str,
        file: &Path,
    ) -> Result<String, StorageError> {
        let key = self.object_key(relative);
        let stored = self.store.put_file(&key, file, Encryption::AtRest).await?;
        let bytes = match tokio::fs::metadata(file).await {
            Ok(meta) => meta.len(),
            Err(_) => stored,
        };
        let url = self.store.signed_url(&key, self.expiry).await?;

        tracing::info!(%key, size_mb = %format_mebibytes(bytes), "uploaded {display_name}");
        Ok(describe(display_name, bytes, &url))
    }

    /// Upload `file` and record its manifest line against `project_id`.
    pub async fn upload_for_project(
        &self,
        project_id: &str,
        display_name: &str,
        relative: &str,
        file: &Path,
    ) -> Result<(), StorageError> {
        let line = self.upload(display_name, relative, file).await?;
        self.registry.record_email_line(project_id, line)?;
        Ok(())
    }
}
