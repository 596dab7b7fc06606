//! Enumerating the projects stored in the source database.

use serde::Deserialize;
use serde_json::Value;

use crate::error::MongoError;
use crate::invocation::{ExportOptions, MongoTarget, MongoTools};
use crate::runner::ToolRunner;

const PROJECTS_COLLECTION: &str = "projects";

/// One row of the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct RawProject {
    #[serde(rename = "_id")]
    id: Value,
    #[serde(default)]
    name: Option<String>,
}

/// List every project's id and name via `mongoexport` to stdout.
pub async fn list_projects(
    runner: &dyn ToolRunner,
    tools: &MongoTools,
    target: &MongoTarget,
) -> Result<Vec<ProjectEntry>, MongoError> {
    let inv = tools.export(
        target,
        PROJECTS_COLLECTION,
        &ExportOptions {
            fields: vec!["name".to_string()],
            ..Default::default()
        },
    );
    let output = runner.run(&inv).await?;
    parse_project_lines(&output.stdout)
}

/// Parse newline-delimited extended JSON documents.
///
/// Documents without a name are skipped.
pub fn parse_project_lines(stdout: &str) -> Result<Vec<ProjectEntry>, MongoError> {
    let mut entries = Vec::new();
    for line in stdout.lines().map(str::trim).filter(|l| l.starts_with('{')) {
        let raw: RawProject = serde_json::from_str(line)?;
        let Some(name) = raw.name else {
            tracing::warn!(line, "project without a name, skipping");
            continue;
        };
        entries.push(ProjectEntry {
            id: object_id(&raw.id)?,
            name,
        });
    }
    Ok(entries)
}

fn object_id(value: &Value) -> Result<String, MongoError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => map
            .get("$oid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MongoError::Parse(format!("unsupported _id: {value}"))),
        other => Ok(other.to_string()),
    }
}
