//! # nd-mongo
//!
//! Everything nightdump does against MongoDB, expressed as invocations of the
//! stock command-line tools (`mongo`, `mongodump`, `mongoexport`):
//!
//! - [`MongoTools`] builds explicit argument vectors; nothing goes through a shell
//! - [`ToolRunner`] executes them ([`ProcessRunner`] in production)
//! - [`select_secondary`] finds a replica set member safe to read from
//! - [`list_projects`] enumerates the project directory
//! - [`ExportCoordinator`] fans out exports and waits for all of them

pub mod coordinator;
pub mod directory;
pub mod error;
pub mod invocation;
pub mod replica;
pub mod runner;

pub use coordinator::{ExportCoordinator, ExportJob, JobReport};
pub use directory::{ProjectEntry, list_projects};
pub use error::{JobFailure, MongoError};
pub use invocation::{
    DumpOptions, ExportOptions, Invocation, MongoTarget, MongoTools, object_id_query,
};
pub use replica::{SECONDARY_PROBE, select_secondary};
pub use runner::{ProcessRunner, ToolOutput, ToolRunner};
