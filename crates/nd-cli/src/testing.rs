//! Scripted stand-ins for the MongoDB tools, shared by the pipeline tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use nd_config::{Credentials, DatabaseConfig, NightdumpConfig};
use nd_core::FixedClock;
use nd_mail::RecordingMailer;
use nd_mongo::{Invocation, MongoError, ToolOutput, ToolRunner};
use nd_storage::MemoryArtifactStore;

use crate::pipeline::Collaborators;

pub const SECONDARY: &str = "db2:27017";
pub const GALAXY_ZOO_ID: &str = "5077375154558fabd7000001";
pub const PLANET_HUNTERS_ID: &str = "5077375154558fabd7000002";
pub const SEAFLOOR_ID: &str = "5077375154558fabd7000003";

/// Collections every whole-database dump contains.
pub const DATABASE_COLLECTIONS: &[&str] = &[
    "boards",
    "discussions",
    "projects",
    "subject_sets",
    "users",
    "messages",
    "subjects",
    "classifications",
    "galaxy_zoo_subjects",
];

pub fn stamp_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

/// Answers probes, project listings, exports, and dumps by writing small
/// files where the real tools would.
#[derive(Debug, Default)]
pub struct FakeMongo {
    calls: Mutex<Vec<Invocation>>,
    fail_markers: Mutex<Vec<String>>,
}

impl FakeMongo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every later invocation whose arguments contain `marker`.
    pub fn fail_when_arg_contains(&self, marker: impl Into<String>) {
        self.fail_markers.lock().expect("lock").push(marker.into());
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }

    fn should_fail(&self, invocation: &Invocation) -> bool {
        let markers = self.fail_markers.lock().expect("lock");
        invocation
            .args
            .iter()
            .any(|arg| markers.iter().any(|m| arg.contains(m.as_str())))
    }
}

#[async_trait]
impl ToolRunner for FakeMongo {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, MongoError> {
        self.calls.lock().expect("lock").push(invocation.clone());
        if self.should_fail(invocation) {
            return Err(MongoError::Failed {
                command: invocation.redacted(),
                code: Some(1),
                stderr: "injected failure".into(),
            });
        }

        match invocation.program.as_str() {
            "mongo" => Ok(probe(invocation)),
            "mongoexport" => export(invocation),
            "mongodump" => dump(invocation),
            other => Err(MongoError::Parse(format!("unexpected program {other}"))),
        }
    }
}

fn probe(invocation: &Invocation) -> ToolOutput {
    let secondary = invocation.has_arg(&format!("{SECONDARY}/admin"));
    ToolOutput {
        stdout: if secondary { "true\n" } else { "false\n" }.to_string(),
        stderr: String::new(),
    }
}

fn export(invocation: &Invocation) -> Result<ToolOutput, MongoError> {
    let collection = invocation.value_of("--collection").unwrap_or_default();
    let Some(out) = invocation.value_of("--out") else {
        let stdout = [
            (GALAXY_ZOO_ID, "galaxy_zoo"),
            (PLANET_HUNTERS_ID, "planet_hunters"),
            (SEAFLOOR_ID, "seafloor"),
        ]
        .iter()
        .map(|(id, name)| format!(r#"{{"_id":{{"$oid":"{id}"}},"name":"{name}"}}"#))
        .collect::<Vec<_>>()
        .join("\n");
        return Ok(ToolOutput {
            stdout,
            stderr: String::new(),
        });
    };

    write(Path::new(out), format!(r#"{{"collection":"{collection}"}}"#))?;
    Ok(ToolOutput::default())
}

fn dump(invocation: &Invocation) -> Result<ToolOutput, MongoError> {
    let out = PathBuf::from(invocation.value_of("--out").unwrap_or_default());
    let host = invocation.value_of("--host").unwrap_or_default();
    let db = invocation.value_of("--db").unwrap_or_default();
    let db_dir = out.join(db);

    let collections: Vec<String> = match invocation.value_of("--collection") {
        Some(collection) => vec![collection.to_string()],
        None => {
            let mut all: Vec<String> = DATABASE_COLLECTIONS.iter().map(|c| (*c).to_string()).collect();
            all.push("system.indexes".into());
            all.push("galaxy_zoo_cache".into());
            let skip_system = invocation.has_arg("--excludeCollectionsWithPrefix=system");
            all.retain(|c| !(skip_system && c.starts_with("system")));
            all
        }
    };

    for collection in collections {
        write(&db_dir.join(format!("{collection}.bson")), format!("{host}/{db}.{collection}"))?;
        write(
            &db_dir.join(format!("{collection}.metadata.json")),
            format!(r#"{{"collection":"{collection}"}}"#),
        )?;
    }
    Ok(ToolOutput::default())
}

fn write(path: &Path, contents: String) -> Result<(), MongoError> {
    let io = |e: std::io::Error| MongoError::Parse(format!("{}: {e}", path.display()));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io)?;
    }
    std::fs::write(path, contents).map_err(io)
}

/// A config that passes validation, rooted at `output_dir`.
pub fn config(output_dir: &Path) -> NightdumpConfig {
    let mut config = NightdumpConfig::default();
    config.output_dir = output_dir.to_path_buf();
    config.mongo.hosts = vec!["db1:27017".into(), SECONDARY.into()];
    config.mongo.admin = Credentials {
        user: "admin".into(),
        pass: "admin-secret".into(),
    };
    config.source = DatabaseConfig {
        host: String::new(),
        db_name: "ouroboros".into(),
        user: "backup".into(),
        pass: "backup-secret".into(),
    };
    config.storage.bucket = "zooniverse-backups".into();
    config.storage.access_key_id = "AKIA".into();
    config.storage.secret_access_key = "secret".into();
    config.storage.prefix = "mongo/".into();
    config.mail.ops_address = "ops@example.org".into();
    config.mail.team_from = "team@example.org".into();
    config.mail.noreply_from = "noreply@example.org".into();
    config.filtered_recipients = vec!["partner@example.org".into()];
    config.sanitized_projects = BTreeMap::from([
        (GALAXY_ZOO_ID.to_string(), vec!["gz@example.org".to_string()]),
        (PLANET_HUNTERS_ID.to_string(), vec!["ph@example.org".to_string()]),
    ]);
    config.export.dispatch_stagger_ms = 0;
    config
}

/// Fakes wired into [`Collaborators`], with handles kept for assertions.
pub struct Harness {
    pub mongo: Arc<FakeMongo>,
    pub store: Arc<MemoryArtifactStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            mongo: Arc::new(FakeMongo::new()),
            store: Arc::new(MemoryArtifactStore::new()),
            mailer: Arc::new(RecordingMailer::new()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            runner: self.mongo.clone(),
            store: self.store.clone(),
            mailer: self.mailer.clone(),
            clock: Arc::new(FixedClock(stamp_date())),
        }
    }
}
