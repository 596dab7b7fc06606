//! MongoDB hosts, credentials, and tool binaries.

use serde::{Deserialize, Serialize};

fn default_shell() -> String {
    String::from("mongo")
}

fn default_dump() -> String {
    String::from("mongodump")
}

fn default_export() -> String {
    String::from("mongoexport")
}

/// User/password pair.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

impl Credentials {
    pub fn is_configured(&self) -> bool {
        !self.user.is_empty() && !self.pass.is_empty()
    }
}

/// Names of the MongoDB command-line tools to invoke.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ToolsConfig {
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(default = "default_dump")]
    pub dump: String,
    #[serde(default = "default_export")]
    pub export: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            dump: default_dump(),
            export: default_export(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MongoConfig {
    /// Candidate replica set members, probed in order.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Admin credentials used for the replication status probe.
    #[serde(default)]
    pub admin: Credentials,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// A database reachable with credentials.
///
/// For the main source database `host` is left empty; the selected
/// secondary replica is used instead.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub db_name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

impl DatabaseConfig {
    pub fn credentials(&self) -> Option<Credentials> {
        if self.user.is_empty() {
            None
        } else {
            Some(Credentials {
                user: self.user.clone(),
                pass: self.pass.clone(),
            })
        }
    }
}
