//! # nd-config
//!
//! Layered configuration loading for nightdump using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`NIGHTDUMP_*` prefix, `__` as separator)
//! 2. The run's config file (`--config`, default `/config.yml`); `.toml`
//!    files are read as TOML, anything else as YAML
//! 3. User-level `~/.config/nightdump/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `NIGHTDUMP_STORAGE__BUCKET` -> `storage.bucket`,
//! `NIGHTDUMP_MONGO__ADMIN__PASS` -> `mongo.admin.pass`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use nd_config::NightdumpConfig;
//!
//! let config = NightdumpConfig::load_with_dotenv(Some(Path::new("/config.yml"))).expect("config");
//! config.validate().expect("complete config");
//! ```

mod error;
mod export;
mod mail;
mod mongo;
mod standalone;
mod storage;

pub use error::ConfigError;
pub use export::ExportConfig;
pub use mail::{MailConfig, SmtpConfig};
pub use mongo::{Credentials, DatabaseConfig, MongoConfig, ToolsConfig};
pub use standalone::StandaloneConfig;
pub use storage::StorageConfig;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};
use serde::{Deserialize, Serialize};

/// Where the config file lives when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/config.yml";

fn default_output_dir() -> PathBuf {
    PathBuf::from("/out")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NightdumpConfig {
    #[serde(default)]
    pub mongo: MongoConfig,
    /// The main replicated database.
    #[serde(default)]
    pub source: DatabaseConfig,
    #[serde(default)]
    pub sandbox: Option<DatabaseConfig>,
    #[serde(default)]
    pub staging: Option<DatabaseConfig>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub mail: MailConfig,
    /// Project id -> recipients of that project's sanitized export.
    #[serde(default)]
    pub sanitized_projects: BTreeMap<String, Vec<String>>,
    /// Project ids whose exports are read from the sandbox database.
    #[serde(default)]
    pub sandbox_projects: Vec<String>,
    /// Extra recipients of the externally shareable manifest.
    #[serde(default)]
    pub filtered_recipients: Vec<String>,
    #[serde(default)]
    pub standalone_projects: BTreeMap<String, StandaloneConfig>,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for NightdumpConfig {
    fn default() -> Self {
        Self {
            mongo: MongoConfig::default(),
            source: DatabaseConfig::default(),
            sandbox: None,
            staging: None,
            storage: StorageConfig::default(),
            smtp: SmtpConfig::default(),
            mail: MailConfig::default(),
            sanitized_projects: BTreeMap::new(),
            sandbox_projects: Vec::new(),
            filtered_recipients: Vec::new(),
            standalone_projects: BTreeMap::new(),
            export: ExportConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl NightdumpConfig {
    /// Load configuration from all sources.
    ///
    /// `config_file` is required to exist when given. When `None`,
    /// [`DEFAULT_CONFIG_PATH`] is used if present.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(config_file)?
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(config_file)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or layer more providers.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: The run's config file
        match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile {
                    path: path.to_path_buf(),
                });
            }
            Some(path) => figment = Self::merge_file(figment, path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    figment = Self::merge_file(figment, default_path);
                }
            }
        }

        // Layer 3: Environment variables (highest priority)
        figment = figment.merge(Env::prefixed("NIGHTDUMP_").split("__"));

        Ok(figment)
    }

    fn merge_file(figment: Figment, path: &Path) -> Figment {
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            figment.merge(Toml::file(path))
        } else {
            figment.merge(Yaml::file(path))
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nightdump").join("config.toml"))
    }

    /// Check that everything a full run needs is present.
    ///
    /// Runs before any subprocess is started so an incomplete config never
    /// leaves a half-finished backup behind.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mongo.hosts.is_empty() {
            return Err(not_configured("mongo.hosts"));
        }
        if !self.mongo.admin.is_configured() {
            return Err(not_configured("mongo.admin"));
        }
        if self.source.db_name.is_empty() || self.source.user.is_empty() {
            return Err(not_configured("source"));
        }
        if !self.storage.is_configured() {
            return Err(not_configured("storage"));
        }
        if !self.mail.is_configured() {
            return Err(not_configured("mail"));
        }
        if self.export.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.storage.link_expiry_secs == 0 || self.storage.link_expiry_secs > 604_800 {
            return Err(ConfigError::InvalidValue {
                field: "storage.link_expiry_secs".into(),
                reason: "must be between 1 and 604800 seconds".into(),
            });
        }

        let needs_sandbox = self
            .sanitized_projects
            .keys()
            .any(|id| self.sandbox_projects.contains(id));
        if needs_sandbox
            && self
                .sandbox
                .as_ref()
                .is_none_or(|db| db.host.is_empty() || db.db_name.is_empty())
        {
            return Err(not_configured("sandbox"));
        }

        if let Some(staging) = &self.staging
            && (staging.host.is_empty() || staging.db_name.is_empty())
        {
            return Err(not_configured("staging"));
        }

        let mut stems: BTreeMap<String, &str> = BTreeMap::new();
        for (name, standalone) in &self.standalone_projects {
            if standalone.host.is_empty() || standalone.database.is_empty() {
                return Err(not_configured(&format!("standalone_projects.{name}")));
            }
            for stem in standalone.archive_stems(name) {
                if let Some(other) = stems.insert(stem.clone(), name) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("standalone_projects.{name}"),
                        reason: format!("archive name {stem} is already used by {other}"),
                    });
                }
            }
        }

        for (id, recipients) in &self.sanitized_projects {
            if recipients.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("sanitized_projects.{id}"),
                    reason: "at least one recipient is required".into(),
                });
            }
        }

        Ok(())
    }

    /// Whether sanitized exports of `project_id` read from the sandbox database.
    pub fn is_sandbox_project(&self, project_id: &str) -> bool {
        self.sandbox_projects.iter().any(|id| id == project_id)
    }
}

fn not_configured(section: &str) -> ConfigError {
    ConfigError::NotConfigured {
        section: section.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> NightdumpConfig {
        let mut config = NightdumpConfig::default();
        config.mongo.hosts = vec!["db1:27017".into(), "db2:27017".into()];
        config.mongo.admin = Credentials {
            user: "admin".into(),
            pass: "secret".into(),
        };
        config.source = DatabaseConfig {
            host: String::new(),
            db_name: "ouroboros".into(),
            user: "backup".into(),
            pass: "pw".into(),
        };
        config.storage.bucket = "backups".into();
        config.storage.access_key_id = "key".into();
        config.storage.secret_access_key = "secret".into();
        config.mail = MailConfig {
            ops_address: "ops@example.org".into(),
            team_from: "team@example.org".into(),
            noreply_from: "noreply@example.org".into(),
        };
        config
    }

    #[test]
    fn default_config_is_not_runnable() {
        let config = NightdumpConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("/out"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotConfigured { ref section }) if section == "mongo.hosts"
        ));
    }

    #[test]
    fn complete_config_validates() {
        complete().validate().expect("complete config is valid");
    }

    #[test]
    fn sandbox_project_requires_sandbox_section() {
        let mut config = complete();
        config
            .sanitized_projects
            .insert("abc".into(), vec!["science@example.org".into()]);
        config.sandbox_projects.push("abc".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotConfigured { ref section }) if section == "sandbox"
        ));

        config.sandbox = Some(DatabaseConfig {
            host: "sandbox:27017".into(),
            db_name: "sandbox".into(),
            user: "u".into(),
            pass: "p".into(),
        });
        config.validate().expect("sandbox configured");
        assert!(config.is_sandbox_project("abc"));
    }

    #[test]
    fn sanitized_project_requires_recipients() {
        let mut config = complete();
        config.sanitized_projects.insert("abc".into(), Vec::new());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    fn standalone(sanitized_excludes: &[&str]) -> StandaloneConfig {
        StandaloneConfig {
            host: "db.example".into(),
            port: 27017,
            database: "db".into(),
            username: String::new(),
            password: String::new(),
            sanitized_excludes: sanitized_excludes.iter().map(|c| (*c).to_string()).collect(),
            email_recipients: Vec::new(),
        }
    }

    #[test]
    fn standalone_names_must_not_share_an_archive_name() {
        let mut config = complete();
        config.standalone_projects.insert("a b".into(), standalone(&[]));
        config.standalone_projects.insert("a_b".into(), standalone(&[]));
        let err = config.validate().unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidValue { field, reason }
                if field == "standalone_projects.a_b" && reason.contains("a b")),
            "{err:?}"
        );
    }

    #[test]
    fn standalone_sanitized_stem_counts_towards_uniqueness() {
        let mut config = complete();
        config.standalone_projects.insert("chimps".into(), standalone(&["users"]));
        config.standalone_projects.insert("chimps_sanitized".into(), standalone(&[]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        config.standalone_projects.get_mut("chimps").expect("entry").sanitized_excludes.clear();
        config.validate().expect("distinct stems validate");
    }

    #[test]
    fn link_expiry_is_capped_at_seven_days() {
        let mut config = complete();
        config.storage.link_expiry_secs = 604_801;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "storage.link_expiry_secs"
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = NightdumpConfig::figment(Some(Path::new("/definitely/not/here.yml")));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }
}
