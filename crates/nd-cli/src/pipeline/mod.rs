//! The backup run.
//!
//! Phases run strictly in order and each one is a barrier: concurrent work
//! started inside a phase has joined before the next phase begins.
//!
//! ```text
//! SelectReplica -> EnumerateEntities -> StandaloneBackups -> SanitizedExports
//!   -> FullEntityExports -> GlobalArchives -> Notify -> Cleanup
//! ```
//!
//! Cleanup runs whenever the working directory may have been touched, i.e.
//! after any outcome of the phases following replica selection.

mod error;
mod full;
mod global;
mod notify;
mod sanitized;
mod standalone;
mod state;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use nd_archive::{ArchiveError, ArchiveRequest, BuiltArchive, build_archive, clear_dir, remove_tree};
use nd_config::NightdumpConfig;
use nd_core::inflect::titleize;
use nd_core::{ArchiveKind, ArchiveVariant, Clock, Project, RunContext, RunLayout, RunStamp};
use nd_mail::{Email, Mailer};
use nd_mongo::{ExportCoordinator, MongoTarget, MongoTools, ToolRunner, list_projects, select_secondary};
use nd_storage::{ArtifactStore, Uploader};

pub use error::PipelineError;
pub use state::Uploaded;

use crate::progress::Progress;
use state::RunState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SelectReplica,
    EnumerateEntities,
    StandaloneBackups,
    SanitizedExports,
    FullEntityExports,
    GlobalArchives,
    Notify,
    Cleanup,
}

impl Phase {
    const fn label(self) -> &'static str {
        match self {
            Self::SelectReplica => "selecting secondary replica",
            Self::EnumerateEntities => "enumerating projects",
            Self::StandaloneBackups => "standalone backups",
            Self::SanitizedExports => "sanitized exports",
            Self::FullEntityExports => "full project exports",
            Self::GlobalArchives => "complete database backup",
            Self::Notify => "sending notification mail",
            Self::Cleanup => "cleaning up",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// External systems a run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub runner: Arc<dyn ToolRunner>,
    pub store: Arc<dyn ArtifactStore>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunReport {
    pub stamp: RunStamp,
    pub replica: String,
    pub uploads: Vec<Uploaded>,
    pub emails_sent: usize,
}

pub struct BackupPipeline {
    config: NightdumpConfig,
    tools: MongoTools,
    deps: Collaborators,
}

impl BackupPipeline {
    pub fn new(config: NightdumpConfig, deps: Collaborators) -> Self {
        let tools = MongoTools::new(config.mongo.tools.clone());
        Self {
            config,
            tools,
            deps,
        }
    }

    /// Phase 1: the first configured host that reports itself a secondary.
    pub async fn select_replica(&self) -> Result<String, PipelineError> {
        select_secondary(
            self.deps.runner.as_ref(),
            &self.tools,
            &self.config.mongo.hosts,
            &self.config.mongo.admin,
        )
        .await
        .map_err(PipelineError::Selection)
    }

    /// Execute every phase, then clean up.
    ///
    /// Mail failures do not stop the run; they are reported as
    /// [`PipelineError::Notification`] once cleanup has finished.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let stamp = RunStamp::capture(self.deps.clock.as_ref());
        tracing::info!(%stamp, "backup run starting");

        let replica = tracked(Phase::SelectReplica, self.select_replica()).await?;
        let ctx = RunContext::new(stamp, RunLayout::new(&self.config.output_dir), replica);

        let mut run = Run::new(self, ctx);
        let outcome = run.execute().await;
        let root = run.ctx.layout.root().to_path_buf();
        let cleanup = tracked(Phase::Cleanup, cleanup(root)).await;

        match (outcome, cleanup) {
            (Err(error), cleanup) => {
                if let Err(cleanup_error) = cleanup {
                    tracing::error!(error = %cleanup_error, "cleanup after failed run also failed");
                }
                Err(error)
            }
            (Ok(()), Err(error)) => Err(error),
            (Ok(()), Ok(())) if !run.state.mail_failures.is_empty() => {
                Err(PipelineError::Notification {
                    failures: std::mem::take(&mut run.state.mail_failures),
                })
            }
            (Ok(()), Ok(())) => {
                tracing::info!(
                    uploads = run.state.uploads.len(),
                    emails = run.state.emails_sent,
                    "backup complete"
                );
                Ok(RunReport {
                    stamp,
                    replica: run.ctx.replica.clone(),
                    uploads: std::mem::take(&mut run.state.uploads),
                    emails_sent: run.state.emails_sent,
                })
            }
        }
    }
}

/// Phase 8: empty the working directory. Safe to repeat.
pub async fn cleanup(root: PathBuf) -> Result<(), PipelineError> {
    blocking(move || clear_dir(&root)).await
}

async fn tracked<T, F>(phase: Phase, work: F) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    let progress = Progress::spinner(phase.label());
    let started = Instant::now();
    tracing::info!(%phase, "phase started");

    match work.await {
        Ok(value) => {
            progress.finish_ok(&format!("{phase}: done"));
            tracing::info!(%phase, elapsed_ms = started.elapsed().as_millis(), "phase finished");
            Ok(value)
        }
        Err(error) => {
            progress.finish_err(&format!("{phase}: failed"));
            tracing::error!(%phase, %error, "phase failed");
            Err(error)
        }
    }
}

/// Run filesystem work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, PipelineError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ArchiveError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|join| PipelineError::Io(std::io::Error::other(join)))?
        .map_err(PipelineError::from)
}

/// State of one run in progress.
struct Run<'p> {
    config: &'p NightdumpConfig,
    tools: &'p MongoTools,
    deps: &'p Collaborators,
    ctx: RunContext,
    uploader: Uploader,
    coordinator: ExportCoordinator,
    state: RunState,
}

impl<'p> Run<'p> {
    fn new(pipeline: &'p BackupPipeline, ctx: RunContext) -> Self {
        let config = &pipeline.config;
        let uploader = Uploader::new(
            Arc::clone(&pipeline.deps.store),
            config.storage.prefix.clone(),
            ctx.stamp,
            std::time::Duration::from_secs(config.storage.link_expiry_secs),
            Arc::clone(&ctx.registry),
        );
        let coordinator = ExportCoordinator::new(
            Arc::clone(&pipeline.deps.runner),
            config.export.dispatch_stagger(),
        );
        Self {
            config,
            tools: &pipeline.tools,
            deps: &pipeline.deps,
            ctx,
            uploader,
            coordinator,
            state: RunState::default(),
        }
    }

    async fn execute(&mut self) -> Result<(), PipelineError> {
        tracked(Phase::EnumerateEntities, self.enumerate_entities()).await?;
        tracked(Phase::StandaloneBackups, self.standalone_backups()).await?;
        tracked(Phase::SanitizedExports, self.sanitized_exports()).await?;
        tracked(Phase::FullEntityExports, self.full_entity_exports()).await?;
        tracked(Phase::GlobalArchives, self.global_archives()).await?;
        tracked(Phase::Notify, self.notify()).await
    }

    /// Phase 2: create the working tree and load the project directory.
    async fn enumerate_entities(&mut self) -> Result<(), PipelineError> {
        for dir in self.ctx.layout.skeleton() {
            tokio::fs::create_dir_all(&dir).await?;
        }

        let entries = list_projects(
            self.deps.runner.as_ref(),
            self.tools,
            &self.source_target(),
        )
        .await?;
        for entry in entries {
            self.ctx
                .registry
                .insert(Project::new(entry.id, entry.name, self.ctx.stamp))?;
        }
        tracing::info!(projects = self.ctx.registry.len()?, "projects enumerated");
        Ok(())
    }

    /// The main database on the selected secondary.
    fn source_target(&self) -> MongoTarget {
        MongoTarget::new(&self.ctx.replica, &self.config.source.db_name)
            .with_credentials(self.config.source.credentials())
    }

    fn db_display_name(&self) -> String {
        titleize(&self.config.source.db_name)
    }

    async fn archive(&self, request: ArchiveRequest) -> Result<BuiltArchive, PipelineError> {
        blocking(move || build_archive(&request)).await
    }

    async fn remove(&self, path: &Path) -> Result<(), PipelineError> {
        let path = path.to_path_buf();
        blocking(move || remove_tree(&path)).await
    }

    /// Send `email`; a failure is logged and remembered, never propagated.
    async fn deliver(&mut self, email: Email) {
        match self.deps.mailer.send(&email).await {
            Ok(()) => self.state.emails_sent += 1,
            Err(error) => {
                tracing::error!(subject = %email.subject, %error, "notification not delivered");
                self.state
                    .mail_failures
                    .push(format!("{}: {error}", email.subject));
            }
        }
    }
}

fn variant(kind: ArchiveKind, built: &BuiltArchive, relative_key: String, display_name: String) -> ArchiveVariant {
    ArchiveVariant {
        kind,
        archive_path: built.path.clone(),
        relative_key,
        display_name,
    }
}
