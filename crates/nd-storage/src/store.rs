//! The object storage contract and its backends.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use nd_config::StorageConfig;
use object_store::ObjectStore;
use object_store::aws::{AmazonS3, AmazonS3Builder, AmazonS3ConfigKey};
use object_store::buffered::BufWriter;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use tokio::io::AsyncWriteExt;

use crate::error::StorageError;

/// Server-side encryption requested for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encryption {
    AtRest,
    None,
}

/// Where archives go.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload the file at `path` to `key`. Returns the number of bytes stored.
    async fn put_file(&self, key: &str, path: &Path, encryption: Encryption) -> Result<u64, StorageError>;

    /// A time-limited GET link for `key`.
    async fn signed_url(&self, key: &str, expiry: Duration) -> Result<String, StorageError>;
}

/// S3 (or S3-compatible) bucket.
///
/// Two clients share credentials: one sends SSE-KMS headers on every write,
/// the other sends none.
#[derive(Debug)]
pub struct S3ArtifactStore {
    encrypted: Arc<AmazonS3>,
    plain: Arc<AmazonS3>,
}

impl S3ArtifactStore {
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        if !config.is_configured() {
            return Err(StorageError::NotConfigured(
                "storage.bucket, storage.access_key_id and storage.secret_access_key are required"
                    .into(),
            ));
        }

        Ok(Self {
            encrypted: Arc::new(encrypted_builder(config)?.build()?),
            plain: Arc::new(base_builder(config).build()?),
        })
    }

    fn client(&self, encryption: Encryption) -> Arc<dyn ObjectStore> {
        match encryption {
            Encryption::AtRest => Arc::clone(&self.encrypted) as Arc<dyn ObjectStore>,
            Encryption::None => Arc::clone(&self.plain) as Arc<dyn ObjectStore>,
        }
    }
}

fn base_builder(config: &StorageConfig) -> AmazonS3Builder {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_access_key_id(&config.access_key_id)
        .with_secret_access_key(&config.secret_access_key);
    if !config.endpoint.is_empty() {
        builder = builder
            .with_endpoint(&config.endpoint)
            .with_allow_http(config.endpoint.starts_with("http://"));
    }
    builder
}

/// SSE-KMS on every write; the bucket's default key unless one is configured.
fn encrypted_builder(config: &StorageConfig) -> Result<AmazonS3Builder, StorageError> {
    let mut builder = base_builder(config).with_config(
        "aws_server_side_encryption".parse::<AmazonS3ConfigKey>()?,
        "aws:kms",
    );
    if !config.kms_key_id.is_empty() {
        builder = builder.with_config(
            "aws_sse_kms_key_id".parse::<AmazonS3ConfigKey>()?,
            &config.kms_key_id,
        );
    }
    Ok(builder)
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put_file(&self, key: &str, path: &Path, encryption: Encryption) -> Result<u64, StorageError> {
        let io_err = |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::open(path).await.map_err(io_err)?;
        let mut writer = BufWriter::new(self.client(encryption), ObjectPath::from(key));

        let bytes = match tokio::io::copy(&mut file, &mut writer).await {
            Ok(bytes) => bytes,
            Err(source) => {
                writer.abort().await?;
                return Err(io_err(source));
            }
        };
        writer.shutdown().await.map_err(|e| StorageError::Rejected {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(key, bytes, ?encryption, "object stored");
        Ok(bytes)
    }

    async fn signed_url(&self, key: &str, expiry: Duration) -> Result<String, StorageError> {
        let url = self
            .encrypted
            .signed_url(http::Method::GET, &ObjectPath::from(key), expiry)
            .await?;
        Ok(url.to_string())
    }
}

/// A stored object in [`MemoryArtifactStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub data: Vec<u8>,
    pub encryption: Encryption,
}

/// In-memory store for tests.
///
/// Keys containing any registered failure marker are rejected.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    objects: RwLock<HashMap<String, StoredArtifact>>,
    failures: RwLock<Vec<String>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every later upload whose key contains `marker`.
    pub fn fail_uploads_containing(&self, marker: impl Into<String>) {
        if let Ok(mut failures) = self.failures.write() {
            failures.push(marker.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredArtifact> {
        self.objects.read().ok()?.get(key).cloned()
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put_file(&self, key: &str, path: &Path, encryption: Encryption) -> Result<u64, StorageError> {
        let rejected = self
            .failures
            .read()
            .map(|f| f.iter().any(|marker| key.contains(marker.as_str())))
            .unwrap_or(false);
        if rejected {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                reason: "injected failure".into(),
            });
        }

        let data = tokio::fs::read(path).await.map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bytes = data.len() as u64;
        let mut objects = self.objects.write().map_err(|_| StorageError::Rejected {
            key: key.to_string(),
            reason: "lock poisoned".into(),
        })?;
        objects.insert(key.to_string(), StoredArtifact { data, encryption });
        Ok(bytes)
    }

    async fn signed_url(&self, key: &str, expiry: Duration) -> Result<String, StorageError> {
        Ok(format!(
            "memory://localhost/{key}?expires={}&signature=mock",
            expiry.as_secs()
        ))
    }
}
