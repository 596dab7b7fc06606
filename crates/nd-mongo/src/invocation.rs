//! Structured command lines for the MongoDB tools.
//!
//! Every invocation is an explicit argument vector handed to the OS without a
//! shell, so credentials and queries are never re-parsed or re-quoted.

use std::fmt;
use std::path::{Path, PathBuf};

use nd_config::{Credentials, ToolsConfig};

/// Flags whose following argument is a secret.
const SECRET_FLAGS: &[&str] = &["--password", "-p"];

#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn flag(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Value following `flag`, if present.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Command line safe to log: secret values are masked.
    pub fn redacted(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                parts.push("****".to_string());
                mask_next = false;
                continue;
            }
            mask_next = SECRET_FLAGS.contains(&arg.as_str());
            parts.push(arg.clone());
        }
        parts.join(" ")
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// A database reachable on a specific host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoTarget {
    pub host: String,
    pub db: String,
    pub credentials: Option<Credentials>,
}

impl MongoTarget {
    pub fn new(host: impl Into<String>, db: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            db: db.into(),
            credentials: None,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    pub collection: Option<String>,
    /// Extended-JSON query; requires `collection`.
    pub query: Option<String>,
    pub exclude_collections_with_prefix: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Field allowlist. Empty exports whole documents.
    pub fields: Vec<String>,
    pub query: Option<String>,
    /// Output file. `None` writes to stdout.
    pub out: Option<PathBuf>,
}

/// Builds invocations for the configured tool binaries.
#[derive(Debug, Clone, Default)]
pub struct MongoTools {
    tools: ToolsConfig,
}

impl MongoTools {
    pub const fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }

    /// `mongodump`, producing `{out}/{db}/{collection}.bson` files.
    pub fn dump(&self, target: &MongoTarget, out: &Path, options: &DumpOptions) -> Invocation {
        let mut inv = connect(Invocation::new(&self.tools.dump), target);
        if let Some(collection) = &options.collection {
            inv = inv.flag("--collection", collection);
        }
        if let Some(query) = &options.query {
            inv = inv.flag("--query", query);
        }
        if let Some(prefix) = &options.exclude_collections_with_prefix {
            inv = inv.arg(format!("--excludeCollectionsWithPrefix={prefix}"));
        }
        inv.flag("--out", out.to_string_lossy())
    }

    /// `mongoexport` of one collection as JSON lines.
    pub fn export(&self, target: &MongoTarget, collection: &str, options: &ExportOptions) -> Invocation {
        let mut inv = connect(Invocation::new(&self.tools.export), target)
            .flag("--collection", collection);
        if !options.fields.is_empty() {
            inv = inv.flag("--fields", options.fields.join(","));
        }
        if let Some(query) = &options.query {
            inv = inv.flag("--query", query);
        }
        match &options.out {
            Some(out) => inv.flag("--out", out.to_string_lossy()),
            None => inv.arg("--quiet"),
        }
    }

    /// Evaluate `script` in the shell against `{host}/admin`.
    pub fn shell_eval(&self, host: &str, admin: &Credentials, script: &str) -> Invocation {
        Invocation::new(&self.tools.shell)
            .arg("--quiet")
            .flag("--username", &admin.user)
            .flag("--password", &admin.pass)
            .flag("--authenticationDatabase", "admin")
            .arg(format!("{host}/admin"))
            .flag("--eval", script)
    }
}

fn connect(inv: Invocation, target: &MongoTarget) -> Invocation {
    let inv = inv.flag("--host", &target.host).flag("--db", &target.db);
    match &target.credentials {
        Some(creds) => inv
            .flag("--username", &creds.user)
            .flag("--password", &creds.pass),
        None => inv,
    }
}

/// Extended-JSON filter selecting one document by `ObjectId`.
pub fn object_id_query(id: &str) -> String {
    format!(r#"{{"_id":{{"$oid":"{id}"}}}}"#)
}
