//! S3-compatible object storage configuration.

use serde::{Deserialize, Serialize};

fn default_region() -> String {
    String::from("us-east-1")
}

/// Seven days, the longest lifetime S3 accepts for a presigned URL.
const fn default_link_expiry_secs() -> u64 {
    604_800
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    /// Prepended verbatim to every object key, before the run stamp.
    #[serde(default)]
    pub prefix: String,

    /// Custom endpoint URL (e.g. MinIO). Empty means AWS.
    #[serde(default)]
    pub endpoint: String,

    /// KMS key for server-side encryption. Empty uses the bucket's AWS-managed key.
    #[serde(default)]
    pub kms_key_id: String,

    #[serde(default = "default_link_expiry_secs")]
    pub link_expiry_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            prefix: String::new(),
            endpoint: String::new(),
            kms_key_id: String::new(),
            link_expiry_secs: default_link_expiry_secs(),
        }
    }
}

impl StorageConfig {
    /// Check if the storage config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.bucket.is_empty()
            && !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = StorageConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.link_expiry_secs, 604_800);
    }

    #[test]
    fn configured_when_all_required_fields_set() {
        let config = StorageConfig {
            bucket: "backups".into(),
            access_key_id: "key".into(),
            secret_access_key: "secret".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
