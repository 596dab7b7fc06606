//! Independently hosted databases backed up on their own.

use nd_core::inflect::slugify;
use serde::{Deserialize, Serialize};

const fn default_port() -> u16 {
    27017
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct StandaloneConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Collections omitted from the `{name}_sanitized` archive. Empty means no
    /// sanitized variant is produced.
    #[serde(default)]
    pub sanitized_excludes: Vec<String>,
    #[serde(default)]
    pub email_recipients: Vec<String>,
}

impl StandaloneConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Archive stems produced for the database configured as `name`.
    pub fn archive_stems(&self, name: &str) -> Vec<String> {
        let slug = slugify(name);
        let mut stems = vec![slug.clone()];
        if !self.sanitized_excludes.is_empty() {
            stems.push(format!("{slug}_sanitized"));
        }
        stems
    }
}
